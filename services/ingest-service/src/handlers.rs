use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::models::ErrorResponse;
use crate::service;
use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found()))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::method_not_allowed()),
    )
}

// Raw bytes rather than the Json extractor: every bad body must become the same 500.
pub async fn ingest(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    match service::ingest(&state, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, kind = err.kind(), "error processing file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal()),
            )
                .into_response()
        }
    }
}
