mod app;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod service;
mod state;
mod store;
#[cfg(test)]
mod testutils;

use datapipe_common::{bind_listener, init_tracing, shutdown_signal};

use crate::config::IngestConfig;
use crate::state::AppState;

fn main() -> Result<(), lambda_http::Error> {
    if config::running_in_lambda() {
        // Set before the runtime spawns worker threads that read the environment.
        std::env::set_var(app::IGNORE_STAGE_IN_PATH, "true");
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve())
}

async fn serve() -> Result<(), lambda_http::Error> {
    let _guards = init_tracing("ingest-service");

    let config = IngestConfig::from_env().map_err(|err| {
        tracing::error!(error = %err, "invalid configuration");
        err
    })?;
    // Clients are built once and reused by every invocation.
    let state = AppState::from_config(&config).await?;
    let app = app::build_router(state);

    if config::running_in_lambda() {
        tracing::info!("serving through the lambda runtime");
        return lambda_http::run(app).await;
    }

    let listener = bind_listener(config.port).await?;
    tracing::info!(port = config.port, "ingest service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
