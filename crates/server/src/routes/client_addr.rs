use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http,
    middleware::Next,
    response::Response,
};
use tracing::info;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Caller address for logging: the raw `X-Forwarded-For` value when a proxy
/// set one, else the TCP peer, else `unknown` (no connect info, e.g. in-process tests).
pub fn client_addr<B>(req: &http::Request<B>) -> String {
    if let Some(fwd) = req.headers().get(FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        return fwd.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware: log every incoming request with the caller address.
pub async fn log_client_addr(req: Request, next: Next) -> Response {
    let client = client_addr(&req);
    info!(%client, method = %req.method(), path = %req.uri().path(), "incoming request");
    next.run(req).await
}
