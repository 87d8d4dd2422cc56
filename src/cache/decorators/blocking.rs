//! Blocking Decorator
//!
//! Single-flight admission per key. A lookup that misses keeps the key held by
//! the calling thread, so concurrent lookups of the same key wait until that
//! thread puts a value, removes the key or releases it.

use std::collections::HashMap;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde_json::Value;
use tracing::warn;

use crate::cache::property::mismatched;
use crate::cache::{Cache, Configurable, Decorate, PropertyKind, PropertyValue};
use crate::error::{BoxError, CacheError, Result};

// == Blocking Cache ==
/// Decorator coalescing concurrent misses of the same key.
///
/// Keys are held per thread: only the thread that missed can release a key,
/// by calling `put_object`, `remove_object` or `release` for it.
pub struct BlockingCache {
    delegate: Box<dyn Cache>,
    /// Keys currently held, with the thread holding each
    held: Mutex<HashMap<String, ThreadId>>,
    released: Condvar,
    timeout: Option<Duration>,
}

impl BlockingCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self {
            delegate,
            held: Mutex::new(HashMap::new()),
            released: Condvar::new(),
            timeout: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Bounds how long a lookup waits for a held key. `None` waits forever.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Returns true if some thread currently holds `key`.
    pub fn is_held(&self, key: &str) -> bool {
        self.held.lock().contains_key(key)
    }

    // == Acquire ==
    fn acquire(&self, key: &str) -> Result<()> {
        let me = thread::current().id();
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut held = self.held.lock();

        loop {
            match held.get(key) {
                None => break,
                // Already ours from an earlier miss
                Some(owner) if *owner == me => return Ok(()),
                Some(_) => {}
            }

            match deadline {
                Some(deadline) => {
                    let timed_out = self.released.wait_until(&mut held, deadline).timed_out();
                    if timed_out && held.contains_key(key) {
                        let timeout_ms = self.timeout.map_or(0, |t| t.as_millis());
                        warn!(cache = self.id(), key, timeout_ms = timeout_ms as u64, "lock timeout");
                        return Err(CacheError::LockTimeout {
                            id: self.id().to_string(),
                            key: key.to_string(),
                            timeout_ms,
                        });
                    }
                }
                None => self.released.wait(&mut held),
            }
        }

        held.insert(key.to_string(), me);
        Ok(())
    }

    // == Release ==
    fn release_key(&self, key: &str) {
        let me = thread::current().id();
        let mut held = self.held.lock();
        if held.get(key) == Some(&me) {
            held.remove(key);
            self.released.notify_all();
        }
    }
}

impl Decorate for BlockingCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for BlockingCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        let result = self.delegate.put_object(key, value);
        self.release_key(key);
        result
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        self.acquire(key)?;
        let value = match self.delegate.get_object(key) {
            Ok(value) => value,
            Err(e) => {
                self.release_key(key);
                return Err(e);
            }
        };
        if value.is_some() {
            self.release_key(key);
        }
        Ok(value)
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        let result = self.delegate.remove_object(key);
        self.release_key(key);
        result
    }

    fn release(&self, key: &str) {
        self.release_key(key);
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

    fn configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for BlockingCache {
    fn setter_kind(&self, name: &str) -> Option<PropertyKind> {
        (name == "timeout").then_some(PropertyKind::Long)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        if name != "timeout" {
            return Ok(());
        }
        let millis = value
            .as_i64()
            .ok_or_else(|| mismatched(name, PropertyKind::Long, &value))?;
        // Zero or negative waits forever
        let timeout = u64::try_from(millis)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        self.set_timeout(timeout);
        Ok(())
    }
}
