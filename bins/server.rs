use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn install_panic_hook(service_id: Uuid) {
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "chatboard", event = "panic", %service_id, message = %info, "unhandled panic occurred");
    }));
}

fn main() -> ExitCode {
    // .env first so RUST_LOG / LOG_FORMAT and the config overrides see it
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let service_id = Uuid::new_v4();
    install_panic_hook(service_id);

    let cfg = match server::startup::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "chatboard", event = "config_invalid", error = %e, "cannot start");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "chatboard", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "chatboard",
        event = "start",
        %service_id,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "chatboard server starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "chatboard", event = "stop", %service_id, "server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "chatboard", event = "run_failed", %service_id, error = %e, "server::run returned error");
            ExitCode::FAILURE
        }
    }
}
