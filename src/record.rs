//! Record Module
//!
//! Defines the key/value record and its expiration arithmetic.
//!
//! A record carries an absolute `expire_at` instant rather than a relative
//! TTL, so expiration can be decided from the stored form alone.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};

// == Record ==
/// A key/value record with an optional absolute expiration instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique, non-empty key
    pub key: String,
    /// Opaque payload
    pub value: String,
    /// Expiration instant, None = permanent
    pub expire_at: Option<DateTime<Utc>>,
}

impl Record {
    // == Constructors ==
    /// Creates a record whose expiration is computed from `ttl` at the current time.
    ///
    /// A zero TTL makes the record permanent; a negative TTL, an empty key or
    /// an empty value are rejected.
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: TimeDelta) -> Result<Self> {
        Self::with_ttl_at(key, value, ttl, Utc::now())
    }

    /// Same as [`Record::new`] with an explicit reference instant.
    pub fn with_ttl_at(
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let key = key.into();
        let value = value.into();

        if key.is_empty() {
            return Err(RecordError::Validation("Key cannot be empty".to_string()));
        }
        if value.is_empty() {
            return Err(RecordError::Validation("Value cannot be empty".to_string()));
        }

        Ok(Self {
            key,
            value,
            expire_at: expire_at_from_ttl(ttl, now)?,
        })
    }

    /// Creates a record that never expires.
    pub fn permanent(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expire_at: None,
        }
    }

    // == TTL Overwrite ==
    /// Replaces the expiration of this record, keeping key and value.
    pub fn apply_ttl(&mut self, ttl: TimeDelta, now: DateTime<Utc>) -> Result<()> {
        self.expire_at = expire_at_from_ttl(ttl, now)?;
        Ok(())
    }

    // == Is Expired ==
    /// Checks whether the record has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Boundary condition: a record is expired once `now` reaches `expire_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expire_at {
            Some(expire_at) => now >= expire_at,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None for a permanent record.
    ///
    /// Returns a zero delta once the record has expired.
    pub fn ttl_remaining(&self) -> Option<TimeDelta> {
        self.ttl_remaining_at(Utc::now())
    }

    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expire_at.map(|expire_at| {
            let remaining = expire_at - now;
            if remaining > TimeDelta::zero() {
                remaining
            } else {
                TimeDelta::zero()
            }
        })
    }
}

// == Utility Functions ==
/// Computes the absolute expiration instant for a TTL.
///
/// `ttl == 0` yields None (permanent). The result must be representable as
/// nanoseconds since the Unix epoch, which is how durable adapters persist it.
pub fn expire_at_from_ttl(ttl: TimeDelta, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    if ttl < TimeDelta::zero() {
        return Err(RecordError::Validation(
            "TTL cannot be negative".to_string(),
        ));
    }
    if ttl == TimeDelta::zero() {
        return Ok(None);
    }

    now.checked_add_signed(ttl)
        .filter(|expire_at| expire_at.timestamp_nanos_opt().is_some())
        .map(Some)
        .ok_or_else(|| RecordError::Validation("TTL is out of range".to_string()))
}
