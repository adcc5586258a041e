//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::service::ServiceSettings;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file, None = volatile in-memory store
    pub database_path: Option<PathBuf>,
    /// Reaper sweep interval in seconds
    pub reaper_interval: u64,
    /// Whether reads go through the local cache
    pub cache_enabled: bool,
    /// Seconds an entry may stay in the cache
    pub cache_life_window: u64,
    /// Maximum number of keys held by the cache
    pub cache_max_entries_in_window: usize,
    /// Cache memory ceiling in MiB
    pub cache_hard_max_mb: usize,
    /// Cache statistics report interval in seconds
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_PATH` - SQLite file path (default: unset, in-memory store)
    /// - `REAPER_INTERVAL` - Seconds between reaper sweeps (default: 600)
    /// - `CACHE_ENABLED` - Enable the local cache (default: true)
    /// - `CACHE_LIFE_WINDOW` - Cache entry lifetime in seconds (default: 600)
    /// - `CACHE_MAX_ENTRIES_IN_WINDOW` - Cache key cap (default: 10000)
    /// - `CACHE_HARD_MAX_MB` - Cache memory ceiling in MiB (default: 32)
    /// - `STATS_INTERVAL` - Seconds between cache stats reports (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            database_path: env::var("DATABASE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            reaper_interval: parse_env("REAPER_INTERVAL").unwrap_or(defaults.reaper_interval),
            cache_enabled: parse_env("CACHE_ENABLED").unwrap_or(defaults.cache_enabled),
            cache_life_window: parse_env("CACHE_LIFE_WINDOW")
                .unwrap_or(defaults.cache_life_window),
            cache_max_entries_in_window: parse_env("CACHE_MAX_ENTRIES_IN_WINDOW")
                .unwrap_or(defaults.cache_max_entries_in_window),
            cache_hard_max_mb: parse_env("CACHE_HARD_MAX_MB")
                .unwrap_or(defaults.cache_hard_max_mb),
            stats_interval: parse_env("STATS_INTERVAL").unwrap_or(defaults.stats_interval),
        }
    }

    /// Builds the record service settings.
    ///
    /// Zero intervals are raised to one second and a zero key cap to one key.
    pub fn service_settings(&self) -> ServiceSettings {
        let cache = self.cache_enabled.then(|| CacheConfig {
            life_window: Duration::from_secs(self.cache_life_window),
            max_entries_in_window: self.cache_max_entries_in_window.max(1),
            hard_max_bytes: self.cache_hard_max_mb.saturating_mul(1024 * 1024),
        });

        ServiceSettings {
            reaper_interval: Duration::from_secs(self.reaper_interval.max(1)),
            stats_interval: Duration::from_secs(self.stats_interval.max(1)),
            cache,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_path: None,
            reaper_interval: 600,
            cache_enabled: true,
            cache_life_window: 600,
            cache_max_entries_in_window: 10_000,
            cache_hard_max_mb: 32,
            stats_interval: 3600,
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
