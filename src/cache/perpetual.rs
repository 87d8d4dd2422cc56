//! Perpetual Cache Module
//!
//! The standard in-memory storage strategy: an unbounded HashMap.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::{Cache, FromId};
use crate::error::{BoxError, Result};

// == Perpetual Cache ==
/// Unbounded in-memory storage. Eviction and expiry are added by decorators.
#[derive(Debug)]
pub struct PerpetualCache {
    id: String,
    /// Key-value storage
    entries: Mutex<HashMap<String, Value>>,
}

impl PerpetualCache {
    // == Constructor ==
    /// Creates an empty cache identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl FromId for PerpetualCache {
    fn from_id(id: &str) -> std::result::Result<Self, BoxError> {
        if id.is_empty() {
            return Err("cache instances require an id".into());
        }
        Ok(Self::new(id))
    }
}

impl Cache for PerpetualCache {
    fn id(&self) -> &str {
        &self.id
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().remove(key))
    }

    fn clear(&self) -> Result<()> {
        self.entries.lock().clear();
        Ok(())
    }

    fn size(&self) -> Result<usize> {
        Ok(self.entries.lock().len())
    }
}

// Identity is the id, as with every other cache.
impl PartialEq for PerpetualCache {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PerpetualCache {}
