use std::future::Future;
use std::pin::Pin;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ConversationEntry, ConversationThread};

pub mod memory;
pub mod threads;

pub use memory::MemoryThreadStore;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

/// Fields of a thread that is about to be created with its first entry.
#[derive(Debug, Clone)]
pub struct NewThread<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
    pub first_entry: &'a ConversationEntry,
    pub created_at: i64,
}

/// Persistence of conversation threads. Entries are append-only and keep
/// insertion order; each append is atomic per thread.
pub trait ThreadStore: Send + Sync {
    fn insert_thread<'a>(&'a self, thread: NewThread<'a>) -> StoreFuture<'a, Uuid>;

    /// Returns `false` when the thread does not exist.
    fn append_entry<'a>(
        &'a self,
        thread_id: Uuid,
        entry: &'a ConversationEntry,
    ) -> StoreFuture<'a, bool>;

    fn read_thread<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, Option<ConversationThread>>;

    fn thread_exists<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool>;

    /// Empties the entries but keeps the thread. Returns `false` when the
    /// thread does not exist.
    fn clear_entries<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool>;

    /// Returns `true` when a thread was removed.
    fn delete_thread<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool>;

    /// Threads owned by `user_id`, newest first.
    fn list_threads_for_user<'a>(
        &'a self,
        user_id: &'a str,
    ) -> StoreFuture<'a, Vec<ConversationThread>>;

    fn ping<'a>(&'a self) -> StoreFuture<'a, ()>;
}

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
