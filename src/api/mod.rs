//! API Module
//!
//! HTTP handlers and routing for the record store REST API.
//!
//! # Endpoints
//! - `POST /record` - Create or replace a record
//! - `GET /record` - List all live records
//! - `GET /record/:key` - Retrieve a record by key
//! - `POST /record/ttl` - Replace the TTL of a record
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
