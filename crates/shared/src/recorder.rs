use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{AnswerResult, ConversationEntry};
use crate::repos::{NewThread, StoreError, ThreadStore};

pub const TITLE_WORD_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("conversation thread {0} not found")]
    ThreadNotFound(Uuid),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// First [`TITLE_WORD_LIMIT`] whitespace-separated words of the query.
pub fn derive_title(query: &str) -> String {
    query
        .split_whitespace()
        .take(TITLE_WORD_LIMIT)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Persists completed exchanges. Holds no thread state between calls.
#[derive(Clone)]
pub struct ConversationRecorder {
    store: Arc<dyn ThreadStore>,
}

impl ConversationRecorder {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self { store }
    }

    /// Creates a thread when `thread_id` is absent, otherwise appends to it.
    /// Returns the thread id either way.
    pub async fn record(
        &self,
        thread_id: Option<Uuid>,
        user_id: &str,
        query: &str,
        response: AnswerResult,
    ) -> Result<Uuid, RecordError> {
        match thread_id {
            Some(thread_id) => {
                self.record_followup(thread_id, query, response).await?;
                Ok(thread_id)
            }
            None => self.record_new(user_id, query, response).await,
        }
    }

    pub async fn record_new(
        &self,
        user_id: &str,
        query: &str,
        response: AnswerResult,
    ) -> Result<Uuid, RecordError> {
        let entry = entry_now(query, response);
        let title = derive_title(query);
        let thread_id = self
            .store
            .insert_thread(NewThread {
                user_id,
                title: &title,
                first_entry: &entry,
                created_at: entry.timestamp,
            })
            .await?;

        info!(thread_id = %thread_id, "conversation thread created");
        Ok(thread_id)
    }

    pub async fn record_followup(
        &self,
        thread_id: Uuid,
        query: &str,
        response: AnswerResult,
    ) -> Result<(), RecordError> {
        let entry = entry_now(query, response);
        if !self.store.append_entry(thread_id, &entry).await? {
            return Err(RecordError::ThreadNotFound(thread_id));
        }
        Ok(())
    }

    pub async fn thread_exists(&self, thread_id: Uuid) -> Result<bool, StoreError> {
        self.store.thread_exists(thread_id).await
    }
}

fn entry_now(query: &str, response: AnswerResult) -> ConversationEntry {
    ConversationEntry {
        query: query.to_string(),
        response,
        timestamp: Utc::now().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::{ConversationRecorder, RecordError, derive_title};
    use crate::models::AnswerResult;
    use crate::repos::{MemoryThreadStore, ThreadStore};

    fn answer(text: &str) -> AnswerResult {
        AnswerResult {
            text: Some(text.to_string()),
            stock_image_url: Some("https://cdn/photo.jpg".to_string()),
            ..AnswerResult::default()
        }
    }

    #[test]
    fn title_keeps_first_five_words() {
        assert_eq!(derive_title("What is a stop sign?"), "What is a stop sign?");
        assert_eq!(
            derive_title("  What   does the Eiffel Tower look like at night?"),
            "What does the Eiffel Tower"
        );
        assert_eq!(derive_title("Hi"), "Hi");
    }

    #[tokio::test]
    async fn new_then_followup_round_trip() {
        let store = Arc::new(MemoryThreadStore::new());
        let recorder = ConversationRecorder::new(store.clone());
        let first = answer("A stop sign is a red octagon.");
        let second = answer("It means come to a full stop.");

        let thread_id = recorder
            .record(None, "user-1", "What is a stop sign?", first.clone())
            .await
            .expect("first record should succeed");
        let same_id = recorder
            .record(Some(thread_id), "user-1", "follow up", second.clone())
            .await
            .expect("followup record should succeed");
        assert_eq!(same_id, thread_id);

        let thread = store
            .read_thread(thread_id)
            .await
            .expect("read should succeed")
            .expect("thread should exist");
        assert_eq!(thread.title, "What is a stop sign?");
        assert_eq!(thread.user_id, "user-1");
        assert_eq!(thread.entries.len(), 2);
        assert_eq!(thread.entries[0].query, "What is a stop sign?");
        assert_eq!(thread.entries[0].response, first);
        assert_eq!(thread.entries[1].query, "follow up");
        assert_eq!(thread.entries[1].response, second);
        assert!(thread.entries[0].timestamp <= thread.entries[1].timestamp);
        assert_eq!(thread.created_at, thread.entries[0].timestamp);
    }

    #[tokio::test]
    async fn followup_to_missing_thread_is_not_found() {
        let recorder = ConversationRecorder::new(Arc::new(MemoryThreadStore::new()));
        let missing = Uuid::new_v4();

        let err = recorder
            .record_followup(missing, "follow up", AnswerResult::default())
            .await
            .expect_err("missing thread should fail");

        assert!(matches!(err, RecordError::ThreadNotFound(id) if id == missing));
    }
}
