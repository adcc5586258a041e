//! Storage Module
//!
//! Durable store contract for records plus the adapters behind it.
//!
//! # Adapters
//! - [`MemoryRepository`]: volatile map, used when no database path is configured
//! - [`SqliteRepository`]: SQLite file with the `records` table

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::Record;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// Convenience Result type for store adapters.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Record Repository ==
/// Durable store for records, keyed by a unique string key.
///
/// Implementations must be thread-safe (`Send + Sync`) and provide atomic
/// individual upserts and deletes. No higher-level locking is expected from
/// callers.
///
/// Dropping a returned future abandons the call; adapters that hand work to a
/// blocking thread may still finish that work in the background.
#[async_trait]
pub trait RecordRepository: Send + Sync + 'static {
    /// Creates or replaces the row for `record.key`.
    async fn upsert(&self, record: &Record) -> StoreResult<()>;

    /// Point lookup. Returns `Ok(None)` if the key is absent.
    ///
    /// Expired rows are returned as stored; filtering is the caller's job.
    async fn get(&self, key: &str) -> StoreResult<Option<Record>>;

    /// Returns every stored row, expired ones included, in key order.
    async fn scan_all(&self) -> StoreResult<Vec<Record>>;

    /// Deletes the given keys and returns how many rows were removed.
    ///
    /// Absent keys are ignored, so deleting twice is not an error.
    async fn bulk_delete(&self, keys: &[String]) -> StoreResult<usize>;
}
