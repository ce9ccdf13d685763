use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{MessageResponse, ThreadRequest};
use uuid::Uuid;

use super::AppState;
use super::errors::{
    bad_request_response, not_found_response, store_error_response, thread_not_found_response,
};

/// Ids that are not UUIDs cannot name a stored thread.
pub(super) fn parse_thread_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn requested_thread_id(body: ThreadRequest) -> Result<Uuid, Response> {
    let raw = body
        .thread_id
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| bad_request_response("invalid_input", "No thread_id provided"))?;
    parse_thread_id(&raw).ok_or_else(thread_not_found_response)
}

pub(super) async fn chat_history(
    State(state): State<AppState>,
    Json(body): Json<ThreadRequest>,
) -> Response {
    let thread_id = match requested_thread_id(body) {
        Ok(thread_id) => thread_id,
        Err(response) => return response,
    };
    read_thread_response(&state, thread_id).await
}

pub(super) async fn clear_history(
    State(state): State<AppState>,
    Json(body): Json<ThreadRequest>,
) -> Response {
    let thread_id = match requested_thread_id(body) {
        Ok(thread_id) => thread_id,
        Err(response) => return response,
    };

    match state.threads.clear_entries(thread_id).await {
        Ok(true) => message_response("Chat history cleared"),
        Ok(false) => thread_not_found_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn delete_chat(
    State(state): State<AppState>,
    Json(body): Json<ThreadRequest>,
) -> Response {
    let thread_id = match requested_thread_id(body) {
        Ok(thread_id) => thread_id,
        Err(response) => return response,
    };

    match state.threads.delete_thread(thread_id).await {
        Ok(true) => message_response("chat deleted"),
        Ok(false) => thread_not_found_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn get_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.threads.list_threads_for_user(user_id.trim()).await {
        Ok(threads) => (StatusCode::OK, Json(threads)).into_response(),
        Err(err) => store_error_response(err),
    }
}

/// Like `get_chats`, but a user without threads is reported as not found.
pub(super) async fn get_user_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.threads.list_threads_for_user(user_id.trim()).await {
        Ok(threads) if threads.is_empty() => {
            not_found_response("chats_not_found", "Chats not found")
        }
        Ok(threads) => (StatusCode::OK, Json(threads)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Response {
    let Some(thread_id) = parse_thread_id(&chat_id) else {
        return thread_not_found_response();
    };
    read_thread_response(&state, thread_id).await
}

async fn read_thread_response(state: &AppState, thread_id: Uuid) -> Response {
    match state.threads.read_thread(thread_id).await {
        Ok(Some(thread)) => (StatusCode::OK, Json(thread)).into_response(),
        Ok(None) => thread_not_found_response(),
        Err(err) => store_error_response(err),
    }
}

fn message_response(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}
