use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::chat::ChatService;
use shared::repos::ThreadStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

mod chat;
mod errors;
mod health;
mod observability;
mod threads;


#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub threads: Arc<dyn ThreadStore>,
}

pub fn build_router(app_state: AppState, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health::home))
        .route("/api/health", get(health::health))
        .route("/readyz", get(health::readyz))
        .route("/api/init-chat", post(chat::init_chat))
        .route("/api/generate-answer", post(chat::generate_answer))
        .route("/api/history", post(threads::chat_history))
        .route("/api/clear-history", post(threads::clear_history))
        .route("/api/delete-chat", post(threads::delete_chat))
        .route("/api/get-chats/{user_id}", get(threads::get_chats))
        .route("/api/get-user-chats/{user_id}", get(threads::get_user_chats))
        .route("/api/get-chat/{chat_id}", get(threads::get_chat))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .layer(cors_layer(cors_allowed_origins))
        .with_state(app_state)
}

/// An empty origin list mirrors any requesting origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::very_permissive();
    }

    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable cors origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}
