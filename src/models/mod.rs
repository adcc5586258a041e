//! Request and Response models for the record API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.
//!
//! TTLs travel as signed integers in nanoseconds.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{SetRecordRequest, SetTtlRequest};
pub use responses::{ErrorResponse, HealthResponse, RecordResponse, StatsResponse};
