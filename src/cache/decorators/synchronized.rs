//! Synchronized Decorator
//!
//! One critical section around the whole chain beneath.

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::{Cache, Decorate};
use crate::error::{BoxError, Result};

// == Synchronized Cache ==
/// Serializes every operation on the delegate through a single lock.
///
/// Each inner layer guards its own state, but multi-step operations such as an
/// LRU put followed by an eviction only become atomic under this layer.
pub struct SynchronizedCache {
    delegate: Box<dyn Cache>,
    lock: Mutex<()>,
}

impl SynchronizedCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            lock: Mutex::new(()),
        }
    }
}

impl Decorate for SynchronizedCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for SynchronizedCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock();
        self.delegate.put_object(key, value)
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock();
        self.delegate.get_object(key)
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock();
        self.delegate.remove_object(key)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.delegate.clear()
    }

    fn size(&self) -> Result<usize> {
        let _guard = self.lock.lock();
        self.delegate.size()
    }

    fn delegate(&self) -> Option<&dyn Cache> {
        Some(self.delegate.as_ref())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::decorators::LruCache;
    use crate::cache::PerpetualCache;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        let mut lru = LruCache::new(Box::new(PerpetualCache::new("sync")));
        lru.set_size(16).unwrap();
        let cache = Arc::new(SynchronizedCache::new(Box::new(lru)));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.put_object(&format!("{t}-{i}"), json!(i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size().unwrap(), 16);
    }

    #[test]
    fn test_forwards_identity() {
        let cache = SynchronizedCache::new(Box::new(PerpetualCache::new("sync")));
        assert_eq!(cache.id(), "sync");
    }
}
