//! LRU Decorator Module
//!
//! Least Recently Used eviction on top of any cache.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::property::{invalid_capacity, mismatched, positive_capacity};
use crate::cache::{Cache, Configurable, Decorate, PropertyKind, PropertyValue};
use crate::error::{BoxError, Result};

/// Capacity used until a `size` is configured.
pub const DEFAULT_LRU_SIZE: usize = 1024;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Order of keys by access time
    order: VecDeque<String>,
}

impl LruTracker {
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front), tracking it if new.
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    // == Refresh ==
    /// Moves an already tracked key to the front.
    ///
    /// Returns false and tracks nothing if the key is unknown.
    pub fn refresh(&mut self, key: &str) -> bool {
        match self.order.iter().position(|k| k == key) {
            Some(index) => {
                if let Some(existing) = self.order.remove(index) {
                    self.order.push_front(existing);
                }
                true
            }
            None => false,
        }
    }

    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}

// == LRU Cache ==
/// Decorator evicting the least recently used key once `size` is exceeded.
pub struct LruCache {
    delegate: Box<dyn Cache>,
    tracker: Mutex<LruTracker>,
    capacity: usize,
}

impl LruCache {
    /// Wraps `delegate` with the default capacity.
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            tracker: Mutex::new(LruTracker::new()),
            capacity: DEFAULT_LRU_SIZE,
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

impl Decorate for LruCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for LruCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        self.delegate.put_object(key, value)?;

        let evicted: Vec<String> = {
            let mut tracker = self.tracker.lock();
            tracker.touch(key);
            let mut evicted = Vec::new();
            while tracker.len() > self.capacity {
                match tracker.evict_oldest() {
                    Some(oldest) => evicted.push(oldest),
                    None => break,
                }
            }
            evicted
        };

        for key in evicted {
            self.delegate.remove_object(&key)?;
        }
        Ok(())
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        self.tracker.lock().refresh(key);
        self.delegate.get_object(key)
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        self.tracker.lock().remove(key);
        self.delegate.remove_object(key)
    }

    fn clear(&self) -> Result<()> {
        self.delegate.clear()?;
        self.tracker.lock().clear();
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

impl Configurable for LruCache {
    fn setter_kind(&self, name: &str) -> Option<PropertyKind> {
        match name {
            "size" => Some(PropertyKind::Int),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, &value) {
            ("size", PropertyValue::Int(size)) => self.set_size(positive_capacity(*size)?),
            ("size", other) => Err(mismatched(name, PropertyKind::Int, other)),
            _ => Ok(()),
        }
    }
}
