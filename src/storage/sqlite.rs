//! SQLite-backed record repository.
//!
//! Persists records in a single `records` table using rusqlite. Expiration
//! instants are stored as UTC nanoseconds, NULL for permanent records.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::DateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{RecordRepository, StoreResult};
use crate::error::StoreError;
use crate::record::Record;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        key       TEXT PRIMARY KEY NOT NULL,
        value     TEXT NOT NULL,
        expire_at INTEGER NULL
    );
    CREATE INDEX IF NOT EXISTS idx_records_expire_at ON records (expire_at);
";

/// Keys bound per DELETE statement, kept well below SQLite's parameter limit.
const DELETE_CHUNK_SIZE: usize = 500;

// == SQLite Repository ==
/// SQLite-backed repository.
///
/// `SqliteRepository` is `Clone` and can be shared across threads. The
/// underlying connection is protected by a Mutex and every call runs on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Opens or creates a database at `path` and ensures the schema exists.
    ///
    /// Creates parent directories if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("connection lock poisoned: {e}")))
    }

    /// Runs `op` against the connection on the blocking thread pool.
    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = repo.lock()?;
            op(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl RecordRepository for SqliteRepository {
    async fn upsert(&self, record: &Record) -> StoreResult<()> {
        let expire_at = encode_expire_at(record)?;
        let key = record.key.clone();
        let value = record.value.clone();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO records (key, value, expire_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, expire_at = excluded.expire_at",
                params![key, value, expire_at],
            )?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Record>> {
        let key = key.to_string();
        self.blocking(move |conn| {
            let record = conn
                .query_row(
                    "SELECT key, value, expire_at FROM records WHERE key = ?1",
                    params![key],
                    decode_row,
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn scan_all(&self) -> StoreResult<Vec<Record>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare("SELECT key, value, expire_at FROM records ORDER BY key")?;
            let records = stmt
                .query_map([], decode_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    async fn bulk_delete(&self, keys: &[String]) -> StoreResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let keys = keys.to_vec();
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;

            for chunk in keys.chunks(DELETE_CHUNK_SIZE) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!("DELETE FROM records WHERE key IN ({placeholders})");
                removed += tx.execute(&sql, params_from_iter(chunk.iter()))?;
            }

            tx.commit()?;
            debug!("Deleted {} of {} requested rows", removed, keys.len());
            Ok(removed)
        })
        .await
    }
}

// == Row Mapping ==
fn encode_expire_at(record: &Record) -> StoreResult<Option<i64>> {
    match record.expire_at {
        None => Ok(None),
        Some(expire_at) => expire_at
            .timestamp_nanos_opt()
            .map(Some)
            .ok_or_else(|| StoreError::InvalidRow {
                key: record.key.clone(),
                reason: "expiration is outside the storable range".to_string(),
            }),
    }
}

fn decode_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let expire_at: Option<i64> = row.get(2)?;
    Ok(Record {
        key: row.get(0)?,
        value: row.get(1)?,
        expire_at: expire_at.map(DateTime::from_timestamp_nanos),
    })
}
