mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;

use crate::{error::DataAccessError, models::Note};

/// Maximum number of notes returned by [`NoteRepository::list_recent`].
pub const LIST_LIMIT: i64 = 100;

/// Storage backend for notes.
///
/// Implementations are shared by every in-flight request and must be safe
/// for concurrent use.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Newest notes first, ties broken by id, capped at [`LIST_LIMIT`].
    async fn list_recent(&self) -> Result<Vec<Note>, DataAccessError>;

    /// Notes with the given id. Empty when nothing matches.
    async fn get_by_id(&self, id: i64) -> Result<Vec<Note>, DataAccessError>;

    async fn insert(&self, author: &str, content: &str) -> Result<(), DataAccessError>;

    /// Deleting an id that does not exist succeeds without touching anything.
    async fn delete_by_id(&self, id: i64) -> Result<(), DataAccessError>;
}
