use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Barrier;

use crate::llm::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
    LlmMessage, LlmToolCall,
};
use crate::media::{ImageGenerator, MediaError, MediaFuture, StockMediaSearch};

type ScriptedReply = Result<LlmGatewayResponse, LlmGatewayError>;

/// Replays canned provider replies in order and records every request.
/// With a barrier, plain (tool-less) requests wait on it before replying.
pub(crate) struct ScriptedGateway {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<LlmGatewayRequest>>,
    barrier: Option<Arc<Barrier>>,
}

impl ScriptedGateway {
    pub(crate) fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            barrier: None,
        }
    }

    pub(crate) fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub(crate) fn requests(&self) -> Vec<LlmGatewayRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl LlmGateway for ScriptedGateway {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move {
            let waits = request.tools.is_empty();
            self.requests.lock().expect("requests lock").push(request);
            let reply = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmGatewayError::ProviderFailure(
                        "no scripted reply".to_string(),
                    ))
                });

            if waits && let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            reply
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum MediaOutcome {
    Found(&'static str),
    Empty,
    Fails,
}

impl MediaOutcome {
    fn resolve(self) -> Result<Option<String>, MediaError> {
        match self {
            Self::Found(url) => Ok(Some(url.to_string())),
            Self::Empty => Ok(None),
            Self::Fails => Err(MediaError::ProviderFailure("status=500".to_string())),
        }
    }
}

/// Image generator and stock search with fixed per-source outcomes.
pub(crate) struct FixedMedia {
    generated: MediaOutcome,
    photo: MediaOutcome,
    video: MediaOutcome,
    queries: Mutex<Vec<String>>,
    barrier: Option<Arc<Barrier>>,
}

impl FixedMedia {
    pub(crate) fn new(generated: MediaOutcome, photo: MediaOutcome, video: MediaOutcome) -> Self {
        Self {
            generated,
            photo,
            video,
            queries: Mutex::new(Vec::new()),
            barrier: None,
        }
    }

    pub(crate) fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }

    async fn lookup(&self, query: &str, outcome: MediaOutcome) -> Result<Option<String>, MediaError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_string());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        outcome.resolve()
    }
}

impl ImageGenerator for FixedMedia {
    fn generate_image<'a>(&'a self, prompt: &'a str) -> MediaFuture<'a> {
        Box::pin(self.lookup(prompt, self.generated))
    }
}

impl StockMediaSearch for FixedMedia {
    fn search_photo<'a>(&'a self, query: &'a str) -> MediaFuture<'a> {
        Box::pin(self.lookup(query, self.photo))
    }

    fn search_video<'a>(&'a self, query: &'a str) -> MediaFuture<'a> {
        Box::pin(self.lookup(query, self.video))
    }
}

pub(crate) fn tool_call(name: &str, arguments: &str) -> LlmToolCall {
    LlmToolCall {
        id: Some(format!("call_{name}")),
        kind: "function".to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

pub(crate) fn tool_call_response(tool_calls: Vec<LlmToolCall>) -> LlmGatewayResponse {
    response_with(Some(LlmMessage {
        content: None,
        tool_calls,
    }))
}

pub(crate) fn text_response(content: &str) -> LlmGatewayResponse {
    response_with(Some(LlmMessage {
        content: Some(content.to_string()),
        tool_calls: Vec::new(),
    }))
}

pub(crate) fn empty_response() -> LlmGatewayResponse {
    response_with(None)
}

fn response_with(message: Option<LlmMessage>) -> LlmGatewayResponse {
    LlmGatewayResponse {
        model: "gpt-3.5-turbo-0125".to_string(),
        provider_request_id: None,
        message,
        usage: None,
    }
}
