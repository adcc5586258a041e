//! Error types for the record store
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures raised by a durable store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite driver error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A blocking store call could not be joined
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The store cannot be reached: its database directory could not be
    /// created, or the connection mutex was poisoned by a panicking holder
    #[error("Store connection unavailable: {0}")]
    Unavailable(String),

    /// A record could not be mapped to or from its persisted row
    #[error("Invalid row for key '{key}': {reason}")]
    InvalidRow { key: String, reason: String },
}

// == Cache Error Enum ==
/// Failures raised by the local cache.
///
/// Never surfaced to callers of the record service; a failed cache write
/// only costs a later store round-trip.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Entry alone exceeds the cache's memory ceiling
    #[error("Entry for '{key}' is {size} bytes, above the {max} byte ceiling")]
    EntryTooLarge { key: String, size: usize, max: usize },

    /// Record could not be serialized or deserialized
    #[error("Cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

// == Record Error Enum ==
/// Error taxonomy of the record lifecycle service.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Key absent from the durable store
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Key present but past its expiration instant
    #[error("Record expired: {0}")]
    Expired(String),

    /// Durable store I/O failure, propagated verbatim
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed input, raised before any store access
    #[error("Invalid request: {0}")]
    Validation(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RecordError {
    fn into_response(self) -> Response {
        // Every failure on the record surface is reported as a bad request.
        let body = Json(ErrorResponse::new(self.to_string()));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the record store.
pub type Result<T> = std::result::Result<T, RecordError>;
