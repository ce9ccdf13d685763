use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ErrorBody, ErrorResponse, HealthResponse, MessageResponse, OkResponse};
use tracing::warn;

use super::AppState;

pub(super) async fn home() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Welcome to the Speak Image Backend!".to_string(),
    })
}

pub(super) async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

pub(super) async fn readyz(State(state): State<AppState>) -> Response {
    match state.threads.ping().await {
        Ok(()) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Err(err) => {
            warn!("readiness check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: ErrorBody {
                        code: "store_unavailable".to_string(),
                        message: "Thread store not ready".to_string(),
                    },
                }),
            )
                .into_response()
        }
    }
}
