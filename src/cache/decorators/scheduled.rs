//! Scheduled Clear Decorator
//!
//! Empties the delegate once a fixed interval has elapsed since the last clear.
//! The check runs lazily on each access, so no background task is needed.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::cache::property::mismatched;
use crate::cache::{Cache, Configurable, Decorate, PropertyKind, PropertyValue};
use crate::error::{BoxError, CacheError, Result};

/// Interval used until one is configured.
pub const DEFAULT_CLEAR_INTERVAL: Duration = Duration::from_secs(60 * 60);

// == Scheduled Cache ==
/// Decorator that clears the chain beneath it every `clear_interval`.
pub struct ScheduledCache {
    delegate: Box<dyn Cache>,
    clear_interval: Duration,
    last_clear: Mutex<Instant>,
}

impl ScheduledCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            clear_interval: DEFAULT_CLEAR_INTERVAL,
            last_clear: Mutex::new(Instant::now()),
        }
    }

    pub fn clear_interval(&self) -> Duration {
        self.clear_interval
    }

    pub fn set_clear_interval(&mut self, interval: Duration) {
        self.clear_interval = interval;
    }

    // == Clear When Stale ==
    /// Clears the delegate if the interval has elapsed. Returns true if it did.
    fn clear_when_stale(&self) -> Result<bool> {
        let stale = self.last_clear.lock().elapsed() > self.clear_interval;
        if stale {
            debug!(cache = self.id(), interval_ms = self.clear_interval.as_millis() as u64, "scheduled clear");
            self.clear()?;
        }
        Ok(stale)
    }
}

impl Decorate for ScheduledCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for ScheduledCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        self.clear_when_stale()?;
        self.delegate.put_object(key, value)
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        if self.clear_when_stale()? {
            return Ok(None);
        }
        self.delegate.get_object(key)
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        self.clear_when_stale()?;
        self.delegate.remove_object(key)
    }

    fn clear(&self) -> Result<()> {
        *self.last_clear.lock() = Instant::now();
        self.delegate.clear()
    }

    fn size(&self) -> Result<usize> {
        self.clear_when_stale()?;
        self.delegate.size()
    }

    fn delegate(&self) -> Option<&dyn Cache> {
        Some(self.delegate.as_ref())
    }

    fn configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for ScheduledCache {
    fn setter_kind(&self, name: &str) -> Option<PropertyKind> {
        (name == "clearInterval").then_some(PropertyKind::Long)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        if name != "clearInterval" {
            return Ok(());
        }
        let millis = value
            .as_i64()
            .ok_or_else(|| mismatched(name, PropertyKind::Long, &value))?;
        let millis = u64::try_from(millis).map_err(|_| CacheError::InvalidPropertyValue {
            property: name.to_string(),
            kind: PropertyKind::Long.to_string(),
            value: millis.to_string(),
            reason: "interval cannot be negative".to_string(),
        })?;
        self.set_clear_interval(Duration::from_millis(millis));
        Ok(())
    }
}
