//! API Handlers
//!
//! HTTP request handlers for each record store endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{RecordError, Result};
use crate::models::{
    HealthResponse, RecordResponse, SetRecordRequest, SetTtlRequest, StatsResponse,
};
use crate::service::RecordService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecordService>,
}

impl AppState {
    pub fn new(service: Arc<RecordService>) -> Self {
        Self { service }
    }
}

/// Unwraps a JSON body, reporting malformed input as a validation failure.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| RecordError::Validation(rejection.body_text()))
}

/// Handler for POST /record
///
/// Creates or replaces a record. Responds 200 with an empty body.
pub async fn set_record_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetRecordRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let req = json_body(payload)?;
    if let Some(error_msg) = req.validate() {
        return Err(RecordError::Validation(error_msg));
    }

    let ttl = req.ttl();
    state.service.set(req.key, req.value, ttl).await?;

    Ok(StatusCode::OK)
}

/// Handler for GET /record
///
/// Lists every non-expired record.
pub async fn get_all_handler(State(state): State<AppState>) -> Result<Json<Vec<RecordResponse>>> {
    let records = state.service.get_all().await?;
    Ok(Json(records.iter().map(RecordResponse::from).collect()))
}

/// Handler for GET /record/:key
pub async fn get_record_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RecordResponse>> {
    let record = state.service.get(&key).await?;
    Ok(Json(RecordResponse::from(&record)))
}

/// Handler for GET /record/ttl
///
/// The static `/record/ttl` route shadows `/record/:key` for the key "ttl".
pub async fn get_ttl_key_handler(State(state): State<AppState>) -> Result<Json<RecordResponse>> {
    get_record_handler(State(state), Path("ttl".to_string())).await
}

/// Handler for GET /record/
///
/// `/record/:key` never matches an empty segment; the empty key is rejected
/// like any other invalid key.
pub async fn get_missing_key_handler(
    State(state): State<AppState>,
) -> Result<Json<RecordResponse>> {
    get_record_handler(State(state), Path(String::new())).await
}

/// Handler for POST /record/ttl
///
/// Replaces the TTL of an existing record and returns the updated record.
pub async fn set_ttl_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetTtlRequest>, JsonRejection>,
) -> Result<Json<RecordResponse>> {
    let req = json_body(payload)?;
    if let Some(error_msg) = req.validate() {
        return Err(RecordError::Validation(error_msg));
    }

    let record = state.service.set_ttl(&req.key, req.ttl()).await?;
    Ok(Json(RecordResponse::from(&record)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.service.cache_stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
