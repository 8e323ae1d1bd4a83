use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::messages::MessageService;

pub mod client_addr;
pub mod messages;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<MessageService>,
}

impl AppState {
    pub fn new(messages: Arc<MessageService>) -> Self {
        Self { messages }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health plus the message endpoints,
/// wrapped in client address logging, CORS and HTTP tracing.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/api/messages/:id", delete(messages::delete_message))
        .with_state(state)
        .layer(middleware::from_fn(client_addr::log_client_addr))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
