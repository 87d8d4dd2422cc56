//! Serialized Decorator
//!
//! Stores values as serialized JSON text, so every read yields an
//! independent copy and callers never share cached state.

use serde_json::Value;

use crate::cache::{Cache, Decorate};
use crate::error::{BoxError, CacheError, Result};

// == Serialized Cache ==
/// Decorator that serializes on put and deserializes on get.
pub struct SerializedCache {
    delegate: Box<dyn Cache>,
}

impl SerializedCache {
    pub fn new(delegate: Box<dyn Cache>) -> Self {
        Self { delegate }
    }

    // == Encoding ==
    fn serialize(&self, value: &Value) -> Result<Value> {
        serde_json::to_string(value)
            .map(Value::String)
            .map_err(|e| CacheError::Serialization {
                id: self.id().to_string(),
                reason: e.to_string(),
            })
    }

    fn deserialize(&self, stored: Value) -> Result<Value> {
        match stored {
            Value::String(text) => {
                serde_json::from_str(&text).map_err(|e| CacheError::Serialization {
                    id: self.id().to_string(),
                    reason: e.to_string(),
                })
            }
            other => Err(CacheError::Serialization {
                id: self.id().to_string(),
                reason: format!("stored value is not serialized text: {other}"),
            }),
        }
    }
}

impl Decorate for SerializedCache {
    fn decorate(delegate: Box<dyn Cache>) -> std::result::Result<Self, BoxError> {
        Ok(Self::new(delegate))
    }
}

impl Cache for SerializedCache {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn put_object(&self, key: &str, value: Value) -> Result<()> {
        let stored = self.serialize(&value)?;
        self.delegate.put_object(key, stored)
    }

    fn get_object(&self, key: &str) -> Result<Option<Value>> {
        self.delegate
            .get_object(key)?
            .map(|stored| self.deserialize(stored))
            .transpose()
    }

    fn remove_object(&self, key: &str) -> Result<Option<Value>> {
        self.delegate
            .remove_object(key)?
            .map(|stored| self.deserialize(stored))
            .transpose()
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
}
