use chrono::Utc;
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::{NewThread, Store, StoreError, StoreFuture, ThreadStore};
use crate::models::{ConversationEntry, ConversationThread};

const THREAD_COLUMNS: &str = "id, user_id, title, entries, created_at";

impl Store {
    pub async fn insert_chat_thread(&self, thread: NewThread<'_>) -> Result<Uuid, StoreError> {
        let thread_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO chat_threads (id, user_id, title, entries, created_at, updated_at)
             VALUES ($1, $2, $3, jsonb_build_array($4::jsonb), $5, $5)",
        )
        .bind(thread_id)
        .bind(thread.user_id)
        .bind(thread.title)
        .bind(Json(thread.first_entry))
        .bind(thread.created_at)
        .execute(&self.pool)
        .await?;

        Ok(thread_id)
    }

    /// Appends in a single statement so concurrent writers cannot lose entries.
    pub async fn append_chat_entry(
        &self,
        thread_id: Uuid,
        entry: &ConversationEntry,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE chat_threads
             SET entries = entries || jsonb_build_array($2::jsonb),
                 updated_at = $3
             WHERE id = $1",
        )
        .bind(thread_id)
        .bind(Json(entry))
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn load_chat_thread(
        &self,
        thread_id: Uuid,
    ) -> Result<Option<ConversationThread>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {THREAD_COLUMNS} FROM chat_threads WHERE id = $1"
        ))
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| thread_from_row(&row)).transpose()
    }

    pub async fn chat_thread_exists(&self, thread_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM chat_threads WHERE id = $1)")
                .bind(thread_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn clear_chat_entries(&self, thread_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE chat_threads
             SET entries = '[]'::jsonb,
                 updated_at = $2
             WHERE id = $1",
        )
        .bind(thread_id)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_chat_thread(&self, thread_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM chat_threads WHERE id = $1")
            .bind(thread_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_chat_threads(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversationThread>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {THREAD_COLUMNS}
             FROM chat_threads
             WHERE user_id = $1
             ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(thread_from_row).collect()
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

impl ThreadStore for Store {
    fn insert_thread<'a>(&'a self, thread: NewThread<'a>) -> StoreFuture<'a, Uuid> {
        Box::pin(self.insert_chat_thread(thread))
    }

    fn append_entry<'a>(
        &'a self,
        thread_id: Uuid,
        entry: &'a ConversationEntry,
    ) -> StoreFuture<'a, bool> {
        Box::pin(self.append_chat_entry(thread_id, entry))
    }

    fn read_thread<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, Option<ConversationThread>> {
        Box::pin(self.load_chat_thread(thread_id))
    }

    fn thread_exists<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(self.chat_thread_exists(thread_id))
    }

    fn clear_entries<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(self.clear_chat_entries(thread_id))
    }

    fn delete_thread<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(self.delete_chat_thread(thread_id))
    }

    fn list_threads_for_user<'a>(
        &'a self,
        user_id: &'a str,
    ) -> StoreFuture<'a, Vec<ConversationThread>> {
        Box::pin(self.list_chat_threads(user_id))
    }

    fn ping<'a>(&'a self) -> StoreFuture<'a, ()> {
        Box::pin(Store::ping(self))
    }
}

fn thread_from_row(row: &PgRow) -> Result<ConversationThread, StoreError> {
    let entries_json: Value = row.try_get("entries")?;
    let entries = serde_json::from_value::<Vec<ConversationEntry>>(entries_json)
        .map_err(|err| StoreError::InvalidData(format!("chat thread entries invalid: {err}")))?;

    Ok(ConversationThread {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        entries,
        created_at: row.try_get("created_at")?,
    })
}
