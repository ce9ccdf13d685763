use tracing::info;
use uuid::Uuid;

use crate::answer::{AnswerEngine, AnswerError};
use crate::models::AnswerResult;
use crate::recorder::ConversationRecorder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueryOutcome {
    pub response: AnswerResult,
    pub thread_id: Uuid,
}

/// Boundary-facing entry points: validate, answer, record.
#[derive(Clone)]
pub struct ChatService {
    engine: AnswerEngine,
    recorder: ConversationRecorder,
}

impl ChatService {
    pub fn new(engine: AnswerEngine, recorder: ConversationRecorder) -> Self {
        Self { engine, recorder }
    }

    pub async fn process_new_query(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<NewQueryOutcome, AnswerError> {
        let user_id = required_field("user_id", user_id)?;
        let query = required_field("query", query)?;

        let response = self.engine.answer(query).await?;
        let thread_id = self
            .recorder
            .record(None, user_id, query, response.clone())
            .await?;

        info!(thread_id = %thread_id, has_visual = response.has_visual(), "new query answered");
        Ok(NewQueryOutcome {
            response,
            thread_id,
        })
    }

    /// Fails with `ThreadNotFound` before any provider call when the thread
    /// is unknown.
    pub async fn process_followup_query(
        &self,
        thread_id: Uuid,
        query: &str,
    ) -> Result<AnswerResult, AnswerError> {
        let query = required_field("query", query)?;
        if !self.recorder.thread_exists(thread_id).await? {
            return Err(AnswerError::ThreadNotFound(thread_id));
        }

        let response = self.engine.answer(query).await?;
        self.recorder
            .record_followup(thread_id, query, response.clone())
            .await?;

        info!(thread_id = %thread_id, has_visual = response.has_visual(), "followup query answered");
        Ok(response)
    }
}

fn required_field<'a>(name: &str, value: &'a str) -> Result<&'a str, AnswerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AnswerError::InvalidInput(format!("{name} is required")));
    }
    Ok(trimmed)
}
