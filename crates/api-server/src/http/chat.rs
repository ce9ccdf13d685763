use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{
    GenerateAnswerRequest, GenerateAnswerResponse, InitChatRequest, InitChatResponse,
};

use super::AppState;
use super::errors::{answer_error_response, bad_request_response, thread_not_found_response};
use super::observability::RequestContext;
use super::threads::parse_thread_id;

pub(super) async fn init_chat(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(body): Json<InitChatRequest>,
) -> Response {
    let (Some(query), Some(user_id)) = (non_blank(body.query), non_blank(body.user_id)) else {
        return bad_request_response("invalid_input", "user_query or user_id missing");
    };

    match state.chat.process_new_query(&user_id, &query).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(InitChatResponse {
                response: outcome.response,
                thread_id: outcome.thread_id,
            }),
        )
            .into_response(),
        Err(err) => answer_error_response(err, &context.request_id),
    }
}

pub(super) async fn generate_answer(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(body): Json<GenerateAnswerRequest>,
) -> Response {
    let (Some(query), Some(raw_thread_id)) = (non_blank(body.query), non_blank(body.thread_id))
    else {
        return bad_request_response("invalid_input", "No query or thread_id provided");
    };
    let Some(thread_id) = parse_thread_id(&raw_thread_id) else {
        return thread_not_found_response();
    };

    match state.chat.process_followup_query(thread_id, &query).await {
        Ok(response) => (StatusCode::OK, Json(GenerateAnswerResponse { response })).into_response(),
        Err(err) => answer_error_response(err, &context.request_id),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
