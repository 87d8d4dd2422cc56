//! Logging Decorator
//!
//! Records hit/miss statistics for every lookup and logs the hit ratio.

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::cache::{Cache, CacheStats, Decorate};
use crate::error::{BoxError, Result};

// == Logging Cache ==
/// Decorator counting hits and misses of the chain beneath it.
pub struct LoggingCache {
    delegate: Box<dyn Cache>,
    stats: Mutex<CacheStats>,
}

impl LoggingCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Fraction of lookups that found a value.
    pub fn hit_ratio(&self) -> f64 {
        self.stats.lock().hit_rate()
    }
}

impl Decorate for LoggingCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for LoggingCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        self.delegate.put_object(key, value)
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        let value = self.delegate.get_object(key)?;

        let ratio = {
            let mut stats = self.stats.lock();
            if value.is_some() {
                stats.record_hit();
            } else {
                stats.record_miss();
            }
            stats.hit_rate()
        };
        debug!(cache = self.id(), ratio, "Cache Hit Ratio");

        Ok(value)
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        self.delegate.remove_object(key)
    }

    fn clear(&self) -> Result<()> {
        self.delegate.clear()
    }

    fn size(&self) -> Result<usize> {
        self.delegate.size()
    }

    fn delegate(&self) -> Option<&dyn Cache> {
        Some(self.delegate.as_ref())
    }

    fn stats(&self) -> Option<CacheStats> {
        Some(*self.stats.lock())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PerpetualCache;
    use serde_json::json;

    #[test]
    fn test_counts_hits_and_misses() {
        let cache = LoggingCache::new(Box::new(PerpetualCache::new("logged")));

        cache.put_object("key", json!(1)).unwrap();
        cache.get_object("key").unwrap();
        cache.get_object("key").unwrap();
        cache.get_object("missing").unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((cache.hit_ratio() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_puts_and_removes_are_not_lookups() {
        let cache = LoggingCache::new(Box::new(PerpetualCache::new("logged")));

        cache.put_object("key", json!(1)).unwrap();
        cache.remove_object("key").unwrap();
        cache.clear().unwrap();

        assert_eq!(cache.stats().unwrap().requests(), 0);
    }

    #[test]
    fn test_outermost_logging_layer_wins() {
        let inner: Box<dyn Cache> =
            Box::new(LoggingCache::new(Box::new(PerpetualCache::new("logged"))));
        let outer = LoggingCache::new(inner);

        outer.get_object("missing").unwrap();

        assert_eq!(outer.stats().unwrap().misses, 1);
        assert_eq!(outer.delegate().unwrap().stats().unwrap().misses, 1);
    }
}
