use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::gateway::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
    LlmMessage, LlmTokenUsage, LlmToolCall,
};
use crate::config::ConfigError;
use crate::config_env::{http_base_url_env, optional_trimmed_env, parse_u64_env, require_env};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-0125";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub image_model: String,
    pub timeout_ms: u64,
}

impl OpenAiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: http_base_url_env("OPENAI_BASE_URL", DEFAULT_BASE_URL)?,
            api_key: require_env("OPENAI_API_KEY")?,
            chat_model: optional_trimmed_env("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model: optional_trimmed_env("OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            timeout_ms: parse_u64_env("OPENAI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Client for the OpenAI HTTP API. Serves both chat completions (as an
/// [`LlmGateway`]) and image generation (as a [`crate::media::ImageGenerator`]).
#[derive(Clone)]
pub struct OpenAiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn send_chat_completion(
        &self,
        request: &LlmGatewayRequest,
    ) -> Result<LlmGatewayResponse, LlmGatewayError> {
        let request_body = chat_request_body(&self.config.chat_model, request);

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;

        let status = response.status();
        let header_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(|_| {
            LlmGatewayError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            return Err(LlmGatewayError::ProviderFailure(format!(
                "status={} code={}",
                status.as_u16(),
                parse_provider_error_code(&body)
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|_| {
            LlmGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        let message = parsed.choices.into_iter().next().and_then(|choice| {
            choice.message.map(|message| LlmMessage {
                content: message.content.filter(|content| !content.trim().is_empty()),
                tool_calls: message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(|call| LlmToolCall {
                        id: call.id,
                        kind: call.kind.unwrap_or_else(|| "function".to_string()),
                        name: call.function.name,
                        arguments: call.function.arguments.unwrap_or_default(),
                    })
                    .collect(),
            })
        });

        Ok(LlmGatewayResponse {
            model: parsed
                .model
                .unwrap_or_else(|| self.config.chat_model.clone()),
            provider_request_id: header_request_id.or(parsed.id),
            message,
            usage: parsed.usage.map(|usage| LlmTokenUsage {
                prompt_tokens: clamp_u64_to_u32(usage.prompt_tokens.unwrap_or(0)),
                completion_tokens: clamp_u64_to_u32(usage.completion_tokens.unwrap_or(0)),
                total_tokens: clamp_u64_to_u32(usage.total_tokens.unwrap_or(0)),
            }),
        })
    }
}

impl LlmGateway for OpenAiClient {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move { self.send_chat_completion(&request).await })
    }
}

fn chat_request_body(model: &str, request: &LlmGatewayRequest) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), json!(model));
    body.insert(
        "messages".to_string(),
        json!([
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.user_prompt }
        ]),
    );

    if !request.tools.is_empty() {
        let tools = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect::<Vec<_>>();
        body.insert("tools".to_string(), Value::Array(tools));
        if let Some(tool_choice) = request.tool_choice {
            body.insert("tool_choice".to_string(), json!(tool_choice.as_str()));
        }
    }

    if let Some(temperature) = request.temperature {
        body.insert("temperature".to_string(), json!(temperature));
    }

    Value::Object(body)
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatToolCall {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    function: ChatFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ChatFunctionCall {
    name: String,
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

fn map_transport_error(err: &reqwest::Error) -> LlmGatewayError {
    if err.is_timeout() {
        LlmGatewayError::Timeout
    } else {
        LlmGatewayError::ProviderFailure("request_unavailable".to_string())
    }
}

pub(crate) fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

pub(crate) fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let parsed = serde_json::from_str::<ProviderErrorEnvelope>(body).ok();
    let Some(details) = parsed.and_then(|envelope| envelope.error) else {
        return "unknown".to_string();
    };

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => details.kind.unwrap_or_else(|| "unknown".to_string()),
    }
}

fn clamp_u64_to_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}
