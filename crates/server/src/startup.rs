use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageConfig};
use service::{
    messages::MessageService,
    storage::{InitOutcome, JsonFileStore},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) plus env overrides, validated.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Prepare the data file and wire the message service for `storage`.
pub async fn build_state(storage: &StorageConfig) -> Result<AppState, StartupError> {
    common::env::ensure_data_dir(&storage.data_file).await?;

    let store = JsonFileStore::new(&storage.data_file);
    match store.initialize(storage.on_corrupt).await? {
        InitOutcome::Created => {}
        InitOutcome::Existing { messages } => {
            info!(path = %store.path().display(), messages, "loaded message store");
        }
        InitOutcome::ResetCorrupt { backup } => {
            info!(path = %store.path().display(), backup = %backup.display(), "message store reset");
        }
    }

    let svc = MessageService::new(Arc::new(store), storage.id_strategy);
    Ok(AppState::new(Arc::new(svc)))
}

/// Router for the given storage settings, ready to serve.
pub async fn build_app(storage: &StorageConfig) -> Result<Router, StartupError> {
    let state = build_state(storage).await?;
    Ok(routes::build_router(state, build_cors()))
}

/// Serve `app` on `listener`, exposing the peer address to the logging
/// middleware. Once `shutdown` resolves no new connections are accepted and
/// in-flight requests run to completion, so a started save is never cut off.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(event = "shutdown_signal", "received Ctrl+C, draining requests"),
        // without a signal handler the server just runs until killed
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await
        }
    }
}

/// Public entry: build the app for `cfg` and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg.storage).await?;

    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        data_file = %cfg.storage.data_file.display(),
        id_strategy = ?cfg.storage.id_strategy,
        "message board listening"
    );
    serve(listener, app, shutdown_signal()).await?;
    info!("message board stopped");
    Ok(())
}
