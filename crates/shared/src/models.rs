use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized answer for one query. Every field is independently optional;
/// `None` means "not requested or not found", never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub text: Option<String>,
    pub generated_image_url: Option<String>,
    pub stock_image_url: Option<String>,
    pub stock_video_url: Option<String>,
}

impl AnswerResult {
    pub fn has_visual(&self) -> bool {
        self.generated_image_url.is_some()
            || self.stock_image_url.is_some()
            || self.stock_video_url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub query: String,
    pub response: AnswerResult,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationThread {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub entries: Vec<ConversationEntry>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitChatRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitChatResponse {
    pub response: AnswerResult,
    pub thread_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAnswerRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAnswerResponse {
    pub response: AnswerResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRequest {
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}
