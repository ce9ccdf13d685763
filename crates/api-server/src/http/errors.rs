use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::answer::AnswerError;
use shared::models::{ErrorBody, ErrorResponse};
use shared::repos::StoreError;
use tracing::{error, warn};

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

pub(super) fn bad_request_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, code, message)
}

pub(super) fn not_found_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, code, message)
}

pub(super) fn bad_gateway_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::BAD_GATEWAY, code, message)
}

pub(super) fn thread_not_found_response() -> Response {
    not_found_response("thread_not_found", "Chat history not found")
}

pub(super) fn answer_error_response(err: AnswerError, request_id: &str) -> Response {
    match err {
        AnswerError::InvalidInput(message) => bad_request_response("invalid_input", &message),
        AnswerError::ThreadNotFound(_) => thread_not_found_response(),
        AnswerError::UpstreamProtocol(message) => {
            warn!(request_id = %request_id, "upstream provider protocol error: {message}");
            bad_gateway_response(
                "upstream_protocol_error",
                "Answer provider returned an invalid response",
            )
        }
        AnswerError::UpstreamUnavailable(message) => {
            warn!(request_id = %request_id, "upstream provider unavailable: {message}");
            bad_gateway_response("upstream_unavailable", "Answer provider is unavailable")
        }
        AnswerError::Persistence(store_err) => store_error_response(store_err),
    }
}

pub(super) fn store_error_response(err: StoreError) -> Response {
    error!("database operation failed: {err}");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Unexpected server error",
    )
}
