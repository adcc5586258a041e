//! Response DTOs for the record API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::record::Record;

/// Response body for record reads and POST /record/ttl
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResponse {
    pub key: String,
    pub value: String,
    /// Remaining TTL in nanoseconds, omitted for permanent records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

impl From<&Record> for RecordResponse {
    fn from(record: &Record) -> Self {
        Self {
            key: record.key.clone(),
            value: record.value.clone(),
            // Never report 0 for an expiring record, 0 means permanent
            ttl: record
                .ttl_remaining()
                .map(|remaining| remaining.num_nanoseconds().unwrap_or(i64::MAX).max(1)),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Whether the local cache is enabled
    pub cache_enabled: bool,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub total_bytes: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a StatsResponse from cache statistics, None = cache disabled
    pub fn new(stats: Option<CacheStats>) -> Self {
        let cache_enabled = stats.is_some();
        let stats = stats.unwrap_or_default();
        Self {
            cache_enabled,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    #[test]
    fn test_permanent_record_omits_ttl() {
        let resp = RecordResponse::from(&Record::permanent("a", "v"));
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json, serde_json::json!({"key": "a", "value": "v"}));
    }

    #[test]
    fn test_expiring_record_reports_remaining_nanoseconds() {
        let record = Record::new("a", "v", TimeDelta::seconds(60)).unwrap();
        let resp = RecordResponse::from(&record);

        let ttl = resp.ttl.unwrap();
        assert!(ttl > 0);
        assert!(ttl <= TimeDelta::seconds(60).num_nanoseconds().unwrap());
    }

    #[test]
    fn test_elapsed_record_never_reports_zero() {
        let mut record = Record::permanent("a", "v");
        record.expire_at = Some(Utc::now() - TimeDelta::seconds(1));

        assert_eq!(RecordResponse::from(&record).ttl, Some(1));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(Some(stats));
        assert!(resp.cache_enabled);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_cache_disabled() {
        let resp = StatsResponse::new(None);
        assert!(!resp.cache_enabled);
        assert_eq!(resp.hits, 0);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
