//! Record Store - A key/value record service with per-record TTL
//!
//! Records live in a durable store, hot reads are served from a local
//! cache, and a background reaper purges expired records.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod record;
pub mod service;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{RecordError, StoreError};
pub use record::Record;
pub use service::{RecordService, ServiceSettings};
pub use storage::{MemoryRepository, RecordRepository, SqliteRepository};
