//! Cache Module
//!
//! The `Cache` capability shared by every storage strategy and decorator,
//! the type references used to construct them, and the standard layers.

pub mod decorators;
mod perpetual;
mod property;
mod stats;
mod types;

#[cfg(test)]
mod property_tests;

use serde_json::Value;

use crate::error::Result;

// Re-export public types
pub use perpetual::PerpetualCache;
pub use property::{Configurable, Initialize, PropertyKind, PropertyValue};
pub use stats::CacheStats;
pub use types::{BaseFactory, CacheType, Decorate, DecoratorFactory, FromId};

// == Cache Trait ==
/// A key/value cache layer.
///
/// Storage strategies and decorators implement the same trait, so a decorator
/// is a `Cache` that owns exactly one inner `Cache` and forwards to it.
/// Every operation takes `&self`; layers keep their own state behind locks.
pub trait Cache: Send + Sync {
    /// Identifier of the cache. Decorators return their delegate's id.
    fn id(&self) -> &str;

    fn put_object(&self, key: &str, value: Value) -> Result<()>;

    fn get_object(&self, key: &str) -> Result<Option<Value>>;

    fn remove_object(&self, key: &str) -> Result<Option<Value>>;

    fn clear(&self) -> Result<()>;

    fn size(&self) -> Result<usize>;

    /// Gives up any admission the calling thread holds on `key` without
    /// touching stored values. Forwards inward unless a layer holds keys.
    fn release(&self, key: &str) {
        if let Some(inner) = self.delegate() {
            inner.release(key);
        }
    }

    /// Name of the concrete layer type.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The next inner layer, if this layer is a decorator.
    fn delegate(&self) -> Option<&dyn Cache> {
        None
    }

    /// Hit/miss statistics of the nearest layer that records them.
    fn stats(&self) -> Option<CacheStats> {
        self.delegate().and_then(|inner| inner.stats())
    }

    /// Settable attributes exposed by this layer.
    fn configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }

    /// Post-construction hook exposed by this layer.
    fn initializer(&mut self) -> Option<&mut dyn Initialize> {
        None
    }
}

// == Layers ==
/// Lists the layer kinds of a cache chain, innermost first.
pub fn layers(cache: &dyn Cache) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    let mut current = Some(cache);
    while let Some(layer) = current {
        kinds.push(layer.kind());
        current = layer.delegate();
    }
    kinds.reverse();
    kinds
}

#[cfg(test)]
mod tests {
    use super::decorators::{LoggingCache, LruCache};
    use super::*;
    use std::any::type_name;

    #[test]
    fn test_layers_innermost_first() {
        let base: Box<dyn Cache> = Box::new(PerpetualCache::new("users"));
        let lru: Box<dyn Cache> = Box::new(LruCache::new(base));
        let logging = LoggingCache::new(lru);

        assert_eq!(
            layers(&logging),
            vec![
                type_name::<PerpetualCache>(),
                type_name::<LruCache>(),
                type_name::<LoggingCache>(),
            ]
        );
    }

    #[test]
    fn test_stats_found_through_outer_layers() {
        let base: Box<dyn Cache> = Box::new(PerpetualCache::new("users"));
        let logging: Box<dyn Cache> = Box::new(LoggingCache::new(base));
        let lru = LruCache::new(logging);

        assert!(lru.stats().is_some());
        assert!(PerpetualCache::new("plain").stats().is_none());
    }
}
