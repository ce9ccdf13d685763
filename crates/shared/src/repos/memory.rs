use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewThread, StoreFuture, ThreadStore};
use crate::models::{ConversationEntry, ConversationThread};

/// Process-local thread store. Writes take the map's write lock, so appends
/// to one thread are serialized.
#[derive(Default)]
pub struct MemoryThreadStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    threads: HashMap<Uuid, StoredThread>,
    next_sequence: u64,
}

struct StoredThread {
    thread: ConversationThread,
    sequence: u64,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThreadStore for MemoryThreadStore {
    fn insert_thread<'a>(&'a self, thread: NewThread<'a>) -> StoreFuture<'a, Uuid> {
        Box::pin(async move {
            let thread_id = Uuid::new_v4();
            let mut state = self.state.write().await;
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.threads.insert(
                thread_id,
                StoredThread {
                    thread: ConversationThread {
                        id: thread_id,
                        user_id: thread.user_id.to_string(),
                        title: thread.title.to_string(),
                        entries: vec![thread.first_entry.clone()],
                        created_at: thread.created_at,
                    },
                    sequence,
                },
            );
            Ok(thread_id)
        })
    }

    fn append_entry<'a>(
        &'a self,
        thread_id: Uuid,
        entry: &'a ConversationEntry,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut state = self.state.write().await;
            let Some(stored) = state.threads.get_mut(&thread_id) else {
                return Ok(false);
            };
            stored.thread.entries.push(entry.clone());
            Ok(true)
        })
    }

    fn read_thread<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, Option<ConversationThread>> {
        Box::pin(async move {
            let state = self.state.read().await;
            Ok(state
                .threads
                .get(&thread_id)
                .map(|stored| stored.thread.clone()))
        })
    }

    fn thread_exists<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.state.read().await.threads.contains_key(&thread_id)) })
    }

    fn clear_entries<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut state = self.state.write().await;
            let Some(stored) = state.threads.get_mut(&thread_id) else {
                return Ok(false);
            };
            stored.thread.entries.clear();
            Ok(true)
        })
    }

    fn delete_thread<'a>(&'a self, thread_id: Uuid) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.state.write().await.threads.remove(&thread_id).is_some()) })
    }

    fn list_threads_for_user<'a>(
        &'a self,
        user_id: &'a str,
    ) -> StoreFuture<'a, Vec<ConversationThread>> {
        Box::pin(async move {
            let state = self.state.read().await;
            let mut owned = state
                .threads
                .values()
                .filter(|stored| stored.thread.user_id == user_id)
                .collect::<Vec<_>>();
            owned.sort_by(|left, right| {
                right
                    .thread
                    .created_at
                    .cmp(&left.thread.created_at)
                    .then(right.sequence.cmp(&left.sequence))
            });
            Ok(owned
                .into_iter()
                .map(|stored| stored.thread.clone())
                .collect())
        })
    }

    fn ping<'a>(&'a self) -> StoreFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::MemoryThreadStore;
    use crate::models::{AnswerResult, ConversationEntry};
    use crate::repos::{NewThread, ThreadStore};

    fn entry(query: &str, timestamp: i64) -> ConversationEntry {
        ConversationEntry {
            query: query.to_string(),
            response: AnswerResult {
                text: Some(format!("answer to {query}")),
                ..AnswerResult::default()
            },
            timestamp,
        }
    }

    async fn insert(store: &MemoryThreadStore, user_id: &str, created_at: i64) -> Uuid {
        let first = entry("first", created_at);
        store
            .insert_thread(NewThread {
                user_id,
                title: "first",
                first_entry: &first,
                created_at,
            })
            .await
            .expect("insert should succeed")
    }

    #[tokio::test]
    async fn sequential_appends_preserve_call_order() {
        let store = MemoryThreadStore::new();
        let thread_id = insert(&store, "user-1", 100).await;

        for (index, query) in ["second", "third", "fourth"].into_iter().enumerate() {
            let appended = store
                .append_entry(thread_id, &entry(query, 101 + index as i64))
                .await
                .expect("append should succeed");
            assert!(appended);
        }

        let thread = store
            .read_thread(thread_id)
            .await
            .expect("read should succeed")
            .expect("thread should exist");
        let queries = thread
            .entries
            .iter()
            .map(|entry| entry.query.as_str())
            .collect::<Vec<_>>();
        assert_eq!(queries, vec!["first", "second", "third", "fourth"]);
    }

    #[tokio::test]
    async fn unknown_thread_operations_report_absence() {
        let store = MemoryThreadStore::new();
        let missing = Uuid::new_v4();

        assert!(!store.append_entry(missing, &entry("x", 1)).await.expect("append"));
        assert!(store.read_thread(missing).await.expect("read").is_none());
        assert!(!store.thread_exists(missing).await.expect("exists"));
        assert!(!store.clear_entries(missing).await.expect("clear"));
        assert!(!store.delete_thread(missing).await.expect("delete"));
    }

    #[tokio::test]
    async fn clear_keeps_thread_and_delete_removes_it() {
        let store = MemoryThreadStore::new();
        let thread_id = insert(&store, "user-1", 100).await;

        assert!(store.clear_entries(thread_id).await.expect("clear"));
        let cleared = store
            .read_thread(thread_id)
            .await
            .expect("read")
            .expect("thread should remain");
        assert!(cleared.entries.is_empty());
        assert_eq!(cleared.title, "first");

        assert!(store.delete_thread(thread_id).await.expect("delete"));
        assert!(!store.thread_exists(thread_id).await.expect("exists"));
    }

    #[tokio::test]
    async fn lists_only_owned_threads_newest_first() {
        let store = MemoryThreadStore::new();
        let older = insert(&store, "user-1", 100).await;
        let newer = insert(&store, "user-1", 200).await;
        insert(&store, "user-2", 300).await;

        let threads = store
            .list_threads_for_user("user-1")
            .await
            .expect("list should succeed");

        let ids = threads.iter().map(|thread| thread.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![newer, older]);
    }
}
