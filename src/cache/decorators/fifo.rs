//! FIFO Decorator Module
//!
//! First In First Out eviction on top of any cache.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::property::{invalid_capacity, mismatched, positive_capacity};
use crate::cache::{Cache, Configurable, Decorate, PropertyKind, PropertyValue};
use crate::error::{BoxError, Result};

/// Capacity used until a `size` is configured.
pub const DEFAULT_FIFO_SIZE: usize = 1024;

// == FIFO Cache ==
/// Evicts keys in insertion order once `size` is exceeded.
pub struct FifoCache {
    delegate: Box<dyn Cache>,
    keys: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl FifoCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            keys: Mutex::new(VecDeque::new()),
            capacity: DEFAULT_FIFO_SIZE,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Set Size ==
    /// Changes the capacity. Extra keys are evicted on the next put.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(invalid_capacity(size));
        }
        self.capacity = size;
        Ok(())
    }
}

impl Decorate for FifoCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for FifoCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        let evicted: Vec<String> = {
            let mut keys = self.keys.lock();
            if !keys.iter().any(|k| k == key) {
                keys.push_back(key.to_string());
            }
            let overflow = keys.len().saturating_sub(self.capacity);
            keys.drain(..overflow).collect()
        };

        for oldest in evicted {
            self.delegate.remove_object(&oldest)?;
        }
        self.delegate.put_object(key, value)
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        self.delegate.get_object(key)
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        self.keys.lock().retain(|k| k != key);
        self.delegate.remove_object(key)
    }

    fn clear(&self) -> Result<()> {
        self.delegate.clear()?;
        self.keys.lock().clear();
        Ok(())
    }

    fn size(&self) -> Result<usize> {
        self.delegate.size()
    }

    fn delegate(&self) -> Option<&dyn Cache> {
        Some(self.delegate.as_ref())
    }

    fn configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for FifoCache {
    fn setter_kind(&self, name: &str) -> Option<PropertyKind> {
        (name == "size").then_some(PropertyKind::Int)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, &value) {
            ("size", PropertyValue::Int(size)) => self.set_size(positive_capacity(*size)?),
            ("size", other) => Err(mismatched(name, PropertyKind::Int, other)),
            _ => Ok(()),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PerpetualCache;
    use crate::error::CacheError;
    use serde_json::json;

    #[test]
    fn test_evicts_in_insertion_order() {
        let mut cache = FifoCache::new(Box::new(PerpetualCache::new("fifo")));
        cache.set_size(2).unwrap();

        cache.put_object("a", json!(1)).unwrap();
        cache.put_object("b", json!(2)).unwrap();
        // reads do not change the eviction order
        cache.get_object("a").unwrap();
        cache.put_object("c", json!(3)).unwrap();

        assert_eq!(cache.get_object("a").unwrap(), None);
        assert_eq!(cache.get_object("b").unwrap(), Some(json!(2)));
        assert_eq!(cache.get_object("c").unwrap(), Some(json!(3)));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut cache = FifoCache::new(Box::new(PerpetualCache::new("fifo")));
        cache.set_size(2).unwrap();

        cache.put_object("a", json!(1)).unwrap();
        cache.put_object("b", json!(2)).unwrap();
        cache.put_object("a", json!(10)).unwrap();
        cache.put_object("c", json!(3)).unwrap();

        assert_eq!(cache.get_object("a").unwrap(), None);
        assert_eq!(cache.size().unwrap(), 2);
    }

    #[test]
    fn test_size_property() {
        let mut cache = FifoCache::new(Box::new(PerpetualCache::new("fifo")));
        cache.set_property("size", PropertyValue::Int(8)).unwrap();
        assert_eq!(cache.capacity(), 8);
    }

    #[test]
    fn test_negative_size_reported_as_configured() {
        let mut cache = FifoCache::new(Box::new(PerpetualCache::new("fifo")));

        let err = cache.set_property("size", PropertyValue::Int(-1)).unwrap_err();

        assert!(matches!(
            err,
            CacheError::InvalidPropertyValue { ref value, .. } if value == "-1"
        ));
        assert_eq!(cache.capacity(), DEFAULT_FIFO_SIZE);
    }
}
