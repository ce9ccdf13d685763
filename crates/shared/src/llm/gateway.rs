use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type LlmGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<LlmGatewayResponse, LlmGatewayError>> + Send + 'a>>;

/// A tool the provider may select, in the provider's function-calling shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
}

impl ToolChoice {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmGatewayRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub tools: Vec<ToolDeclaration>,
    pub tool_choice: Option<ToolChoice>,
    pub temperature: Option<f64>,
}

impl LlmGatewayRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>, tool_choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmTokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One function selection made by the provider. `arguments` is the raw JSON
/// text exactly as returned; it is parsed per capability downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmToolCall {
    pub id: Option<String>,
    pub kind: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmMessage {
    pub content: Option<String>,
    pub tool_calls: Vec<LlmToolCall>,
}

#[derive(Debug, Clone)]
pub struct LlmGatewayResponse {
    pub model: String,
    pub provider_request_id: Option<String>,
    /// First choice's message; `None` when the provider returned no choices.
    pub message: Option<LlmMessage>,
    pub usage: Option<LlmTokenUsage>,
}

#[derive(Debug, Error)]
pub enum LlmGatewayError {
    #[error("llm provider request timed out")]
    Timeout,
    #[error("llm provider request failed: {0}")]
    ProviderFailure(String),
    #[error("llm provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

pub trait LlmGateway: Send + Sync {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a>;
}
