//! Request DTOs for the record API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::TimeDelta;
use serde::Deserialize;

/// Request body for POST /record
///
/// # Fields
/// - `key`: The record key
/// - `value`: The value to store
/// - `ttl`: TTL in nanoseconds, omitted or 0 = permanent
#[derive(Debug, Clone, Deserialize)]
pub struct SetRecordRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub ttl: i64,
}

impl SetRecordRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.value.is_empty() {
            return Some("Value cannot be empty".to_string());
        }
        if self.ttl < 0 {
            return Some("TTL cannot be negative".to_string());
        }
        None
    }

    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.ttl)
    }
}

/// Request body for POST /record/ttl
#[derive(Debug, Clone, Deserialize)]
pub struct SetTtlRequest {
    pub key: String,
    /// New TTL in nanoseconds, 0 = permanent
    pub ttl: i64,
}

impl SetTtlRequest {
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.ttl < 0 {
            return Some("TTL cannot be negative".to_string());
        }
        None
    }

    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_without_ttl_is_permanent() {
        let json = r#"{"key": "a", "value": "v"}"#;
        let req: SetRecordRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "a");
        assert_eq!(req.value, "v");
        assert_eq!(req.ttl(), TimeDelta::zero());
    }

    #[test]
    fn test_set_request_ttl_is_nanoseconds() {
        let json = r#"{"key": "b", "value": "v2", "ttl": 1000000}"#;
        let req: SetRecordRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl(), TimeDelta::milliseconds(1));
    }

    #[test]
    fn test_validate_set_request() {
        let valid = SetRecordRequest {
            key: "k".to_string(),
            value: "v".to_string(),
            ttl: 0,
        };
        assert!(valid.validate().is_none());

        let empty_key = SetRecordRequest {
            key: String::new(),
            ..valid.clone()
        };
        assert!(empty_key.validate().is_some());

        let empty_value = SetRecordRequest {
            value: String::new(),
            ..valid.clone()
        };
        assert!(empty_value.validate().is_some());

        let negative = SetRecordRequest { ttl: -1, ..valid };
        assert!(negative.validate().is_some());
    }

    #[test]
    fn test_ttl_request_requires_ttl_field() {
        let missing = serde_json::from_str::<SetTtlRequest>(r#"{"key": "a"}"#);
        assert!(missing.is_err());

        let req: SetTtlRequest = serde_json::from_str(r#"{"key": "a", "ttl": 5}"#).unwrap();
        assert!(req.validate().is_none());
        assert_eq!(req.ttl(), TimeDelta::nanoseconds(5));
    }
}
