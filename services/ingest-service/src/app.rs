use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{healthz, ingest, method_not_allowed, not_found, readyz};
use crate::state::AppState;

/// Read by `lambda_http` when converting API Gateway REST events; keeps the
/// stage name (`/prod`) out of the path the router sees.
pub const IGNORE_STAGE_IN_PATH: &str = "AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(ingest).fallback(method_not_allowed))
        .route("/v1/files", post(ingest).fallback(method_not_allowed))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
