use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use api_server::http::{AppState, build_router};
use shared::answer::AnswerEngine;
use shared::chat::ChatService;
use shared::llm::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
    LlmMessage, LlmToolCall,
};
use shared::media::{ImageGenerator, MediaFuture, StockMediaSearch};
use shared::recorder::ConversationRecorder;
use shared::repos::Store;

/// Text-completion stand-in that replays one message per call.
pub struct ReplayGateway {
    replies: Mutex<VecDeque<LlmMessage>>,
}

impl ReplayGateway {
    pub fn new(replies: Vec<LlmMessage>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

impl LlmGateway for ReplayGateway {
    fn generate<'a>(&'a self, _request: LlmGatewayRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move {
            let message = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .ok_or_else(|| LlmGatewayError::ProviderFailure("status=503".to_string()))?;
            Ok(LlmGatewayResponse {
                model: "gpt-3.5-turbo-0125".to_string(),
                provider_request_id: None,
                message: Some(message),
                usage: None,
            })
        })
    }
}

/// Visual sources where the generator and photo search succeed and video
/// search finds nothing.
pub struct PartialMedia;

impl ImageGenerator for PartialMedia {
    fn generate_image<'a>(&'a self, _prompt: &'a str) -> MediaFuture<'a> {
        Box::pin(async { Ok(Some("https://img/generated.png".to_string())) })
    }
}

impl StockMediaSearch for PartialMedia {
    fn search_photo<'a>(&'a self, _query: &'a str) -> MediaFuture<'a> {
        Box::pin(async { Ok(Some("https://cdn/photo.jpg".to_string())) })
    }

    fn search_video<'a>(&'a self, _query: &'a str) -> MediaFuture<'a> {
        Box::pin(async { Ok(None) })
    }
}

pub fn selects(calls: &[(&str, &str)]) -> LlmMessage {
    LlmMessage {
        content: None,
        tool_calls: calls
            .iter()
            .map(|(name, arguments)| LlmToolCall {
                id: None,
                kind: "function".to_string(),
                name: (*name).to_string(),
                arguments: (*arguments).to_string(),
            })
            .collect(),
    }
}

pub fn says(text: &str) -> LlmMessage {
    LlmMessage {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
    }
}

pub fn build_test_router(store: Store, replies: Vec<LlmMessage>) -> axum::Router {
    let threads = Arc::new(store);
    let media = Arc::new(PartialMedia);
    let chat = ChatService::new(
        AnswerEngine::new(Arc::new(ReplayGateway::new(replies)), media.clone(), media),
        ConversationRecorder::new(threads.clone()),
    );

    build_router(
        AppState {
            chat: Arc::new(chat),
            threads,
        },
        &[],
    )
}
