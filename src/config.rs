//! Configuration Module
//!
//! Loads server settings and the served cache's declaration from environment
//! variables.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::builder::CacheSpec;
use crate::cache::CacheType;
use crate::error::{CacheError, Result};

/// Server and cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Id of the served cache
    pub cache_id: String,
    /// Alias of the base implementation (standard strategy when unset)
    pub implementation: Option<String>,
    /// Alias of the eviction decorator (LRU when unset)
    pub eviction: Option<String>,
    /// Capacity hint
    pub size: Option<i32>,
    /// Scheduled clear interval in milliseconds
    pub flush_interval_ms: Option<u64>,
    /// Serialize cached values
    pub read_write: bool,
    /// Coalesce concurrent misses per key
    pub blocking: bool,
    /// Longest wait for a held key in milliseconds (unbounded when unset)
    pub blocking_timeout_ms: Option<u64>,
    /// Extra properties bound onto cache layers
    pub properties: BTreeMap<String, String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_ID` - Cache id (default: "default")
    /// - `CACHE_IMPLEMENTATION` - Base implementation alias (default: unset)
    /// - `CACHE_EVICTION` - Eviction decorator alias (default: unset)
    /// - `CACHE_SIZE` - Capacity (default: unset)
    /// - `CACHE_FLUSH_INTERVAL` - Clear interval in milliseconds (default: unset)
    /// - `CACHE_READ_WRITE` - Serialize values (default: true)
    /// - `CACHE_BLOCKING` - Blocking lookups (default: false)
    /// - `CACHE_BLOCKING_TIMEOUT` - Blocked lookup timeout in milliseconds (default: unset)
    /// - `CACHE_PROPERTIES` - `name=value` pairs separated by commas
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_id: env::var("CACHE_ID").unwrap_or(defaults.cache_id),
            implementation: env::var("CACHE_IMPLEMENTATION").ok(),
            eviction: env::var("CACHE_EVICTION").ok(),
            size: parsed_var("CACHE_SIZE"),
            flush_interval_ms: parsed_var("CACHE_FLUSH_INTERVAL"),
            read_write: parsed_var("CACHE_READ_WRITE").unwrap_or(defaults.read_write),
            blocking: parsed_var("CACHE_BLOCKING").unwrap_or(defaults.blocking),
            blocking_timeout_ms: parsed_var("CACHE_BLOCKING_TIMEOUT"),
            properties: env::var("CACHE_PROPERTIES")
                .map(|raw| parse_properties(&raw))
                .unwrap_or_default(),
        }
    }

    // == Cache Spec ==
    /// Builds the declaration of the served cache.
    ///
    /// Fails with `InvalidRequest` when an alias does not name a known type.
    pub fn cache_spec(&self) -> Result<CacheSpec> {
        let mut spec = CacheSpec::new(self.cache_id.clone())
            .read_write(self.read_write)
            .blocking(self.blocking)
            .properties(self.properties.clone());

        if let Some(alias) = &self.implementation {
            spec = spec.implementation(resolve(alias)?);
        }
        if let Some(alias) = &self.eviction {
            spec = spec.add_decorator(resolve(alias)?);
        }
        if let Some(size) = self.size {
            spec = spec.size(size);
        }
        if let Some(ms) = self.flush_interval_ms {
            spec = spec.clear_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = self.blocking_timeout_ms {
            spec = spec.blocking_timeout(Duration::from_millis(ms));
        }
        Ok(spec)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_id: "default".to_string(),
            implementation: None,
            eviction: None,
            size: None,
            flush_interval_ms: None,
            read_write: true,
            blocking: false,
            blocking_timeout_ms: None,
            properties: BTreeMap::new(),
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn resolve(alias: &str) -> Result<CacheType> {
    CacheType::from_alias(alias)
        .ok_or_else(|| CacheError::InvalidRequest(format!("Unknown cache type alias '{alias}'")))
}

/// Parses `name=value` pairs separated by commas. Malformed pairs are skipped.
pub fn parse_properties(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
