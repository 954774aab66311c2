//! Persistence port for daily logs. Rows are always scoped to one user and
//! keyed by `(user_id, log_date)`.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{LogEntry, ValidatedEntry};

mod memory;
mod postgres;

pub use memory::MemoryEntryStore;
pub use postgres::PgEntryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an entry for {0} already exists")]
    DuplicateDate(NaiveDate),

    #[error("no entry for {0}")]
    NotFound(NaiveDate),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All of a user's entries, newest first.
    async fn list(&self, user_id: Uuid) -> StoreResult<Vec<LogEntry>>;

    /// Entries dated on or after `cutoff`, newest first.
    async fn list_since(&self, user_id: Uuid, cutoff: NaiveDate) -> StoreResult<Vec<LogEntry>>;

    async fn get(&self, user_id: Uuid, log_date: NaiveDate) -> StoreResult<Option<LogEntry>>;

    /// Fails with [`StoreError::DuplicateDate`] when the date is taken.
    async fn insert(&self, user_id: Uuid, entry: ValidatedEntry) -> StoreResult<LogEntry>;

    /// Replaces the entry stored for `entry.log_date`.
    async fn update(&self, user_id: Uuid, entry: ValidatedEntry) -> StoreResult<LogEntry>;

    async fn delete(&self, user_id: Uuid, log_date: NaiveDate) -> StoreResult<()>;

    /// Removes every entry of the user, returning how many were deleted.
    async fn delete_all(&self, user_id: Uuid) -> StoreResult<u64>;
}
