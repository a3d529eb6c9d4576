use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{LIST_LIMIT, NoteRepository};
use crate::{error::DataAccessError, models::Note};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<Note>,
}

/// In-process repository with the same ordering and id semantics as
/// [`super::PgRepository`].
#[derive(Default)]
pub struct MemoryRepository {
    table: RwLock<Table>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NoteRepository for MemoryRepository {
    async fn list_recent(&self) -> Result<Vec<Note>, DataAccessError> {
        let table = self.table.read().await;

        let mut notes = table.rows.clone();
        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        notes.truncate(usize::try_from(LIST_LIMIT).unwrap_or(usize::MAX));

        Ok(notes)
    }

    async fn get_by_id(&self, id: i64) -> Result<Vec<Note>, DataAccessError> {
        let table = self.table.read().await;

        Ok(table.rows.iter().filter(|n| n.id == id).cloned().collect())
    }

    async fn insert(&self, author: &str, content: &str) -> Result<(), DataAccessError> {
        let mut table = self.table.write().await;

        table.next_id += 1;
        let note = Note {
            id: table.next_id,
            author: author.to_owned(),
            content: content.to_owned(),
            created_at: Utc::now(),
        };
        table.rows.push(note);

        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DataAccessError> {
        self.table.write().await.rows.retain(|n| n.id != id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn insert_then_list_returns_note() {
        let repo = MemoryRepository::new();
        let before = Utc::now();

        repo.insert("a", "b").await.unwrap();

        let notes = repo.list_recent().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].author, "a");
        assert_eq!(notes[0].content, "b");
        assert!(notes[0].created_at >= before);
    }

    #[tokio::test]
    async fn list_on_empty_table_is_empty() {
        let repo = MemoryRepository::new();
        assert!(repo.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_capped_and_newest_first() {
        let repo = MemoryRepository::new();
        for i in 0..130 {
            repo.insert("author", &format!("note {i}")).await.unwrap();
        }

        let notes = repo.list_recent().await.unwrap();
        assert_eq!(notes.len(), 100);
        assert_eq!(notes[0].content, "note 129");
        assert_eq!(notes[99].content, "note 30");
        for pair in notes.windows(2) {
            assert!(
                (pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id),
                "out of order: {} before {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let repo = MemoryRepository::new();
        repo.insert("a", "first").await.unwrap();
        repo.insert("a", "second").await.unwrap();

        assert_eq!(repo.get_by_id(1).await.unwrap()[0].content, "first");
        assert_eq!(repo.get_by_id(2).await.unwrap()[0].content, "second");
    }

    #[tokio::test]
    async fn get_unknown_id_is_empty() {
        let repo = MemoryRepository::new();
        repo.insert("a", "b").await.unwrap();

        assert!(repo.get_by_id(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_id_is_a_noop() {
        let repo = MemoryRepository::new();
        repo.insert("a", "b").await.unwrap();

        repo.delete_by_id(42).await.unwrap();

        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_only_the_matching_note() {
        let repo = MemoryRepository::new();
        repo.insert("a", "keep").await.unwrap();
        repo.insert("a", "drop").await.unwrap();

        repo.delete_by_id(2).await.unwrap();

        let notes = repo.list_recent().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "keep");
        assert!(repo.get_by_id(2).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_are_all_kept() {
        let repo = Arc::new(MemoryRepository::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert("writer", &format!("note {i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut contents: Vec<_> = repo
            .list_recent()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.content)
            .collect();
        contents.sort();
        contents.dedup();
        assert_eq!(contents.len(), 50);
    }
}
