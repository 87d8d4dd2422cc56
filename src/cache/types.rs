//! Cache Type References
//!
//! A `CacheType` names a cache layer type and carries the construction paths
//! that type supports. Construction paths are checked when a cache is built.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::cache::decorators::{
    BlockingCache, FifoCache, LoggingCache, LruCache, ScheduledCache, SerializedCache,
    SynchronizedCache,
};
use crate::cache::{Cache, PerpetualCache};
use crate::error::BoxError;

/// Creates a base cache from its id.
pub type BaseFactory = fn(&str) -> Result<Box<dyn Cache>, BoxError>;

/// Creates a decorator wrapping an inner cache.
pub type DecoratorFactory = fn(Box<dyn Cache>) -> Result<Box<dyn Cache>, BoxError>;

// == Construction Traits ==
/// A storage strategy constructible from a single cache id.
pub trait FromId: Cache + Sized + 'static {
    fn from_id(id: &str) -> Result<Self, BoxError>;
}

/// A decorator constructible from a single inner cache.
pub trait Decorate: Cache + Sized + 'static {
    fn decorate(delegate: Box<dyn Cache>) -> Result<Self, BoxError>;
}

fn construct_base<T: FromId>(id: &str) -> Result<Box<dyn Cache>, BoxError> {
    Ok(Box::new(T::from_id(id)?))
}

fn construct_decorator<T: Decorate>(delegate: Box<dyn Cache>) -> Result<Box<dyn Cache>, BoxError> {
    Ok(Box::new(T::decorate(delegate)?))
}

// == Cache Type ==
/// Reference to a cache layer type.
///
/// Equality is type identity; the factories are not compared.
#[derive(Clone, Copy)]
pub struct CacheType {
    name: &'static str,
    type_id: TypeId,
    base: Option<BaseFactory>,
    decorator: Option<DecoratorFactory>,
}

impl CacheType {
    /// Reference to a storage strategy type.
    pub fn base<T: FromId>() -> Self {
        Self {
            base: Some(construct_base::<T>),
            ..Self::opaque::<T>()
        }
    }

    /// Reference to a decorator type.
    pub fn decorator<T: Decorate>() -> Self {
        Self {
            decorator: Some(construct_decorator::<T>),
            ..Self::opaque::<T>()
        }
    }

    /// Reference to a type without any known construction path.
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            base: None,
            decorator: None,
        }
    }

    /// The standard in-memory strategy.
    pub fn perpetual() -> Self {
        Self::base::<PerpetualCache>()
    }

    // == Aliases ==
    /// Resolves one of the standard type aliases, ignoring case.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let resolved = match alias.to_ascii_uppercase().as_str() {
            "PERPETUAL" => Self::perpetual(),
            "LRU" => Self::decorator::<LruCache>(),
            "FIFO" => Self::decorator::<FifoCache>(),
            "SCHEDULED" => Self::decorator::<ScheduledCache>(),
            "SERIALIZED" => Self::decorator::<SerializedCache>(),
            "LOGGING" => Self::decorator::<LoggingCache>(),
            "SYNCHRONIZED" => Self::decorator::<SynchronizedCache>(),
            "BLOCKING" => Self::decorator::<BlockingCache>(),
            _ => return None,
        };
        Some(resolved)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this references exactly `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn base_factory(&self) -> Option<BaseFactory> {
        self.base
    }

    pub fn decorator_factory(&self) -> Option<DecoratorFactory> {
        self.decorator
    }
}

impl PartialEq for CacheType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CacheType {}

impl fmt::Debug for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheType").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolution_ignores_case() {
        assert_eq!(CacheType::from_alias("lru"), Some(CacheType::decorator::<LruCache>()));
        assert_eq!(CacheType::from_alias("Perpetual"), Some(CacheType::perpetual()));
        assert_eq!(CacheType::from_alias("SOFT"), None);
    }

    #[test]
    fn test_construction_paths() {
        let base = CacheType::perpetual();
        assert!(base.base_factory().is_some());
        assert!(base.decorator_factory().is_none());

        let lru = CacheType::decorator::<LruCache>();
        assert!(lru.base_factory().is_none());
        assert!(lru.decorator_factory().is_some());

        let opaque = CacheType::opaque::<String>();
        assert!(opaque.base_factory().is_none());
        assert!(opaque.decorator_factory().is_none());
        assert_eq!(opaque.name(), type_name::<String>());
    }

    #[test]
    fn test_equality_is_type_identity() {
        assert_eq!(CacheType::perpetual(), CacheType::opaque::<PerpetualCache>());
        assert!(CacheType::perpetual().is::<PerpetualCache>());
        assert!(!CacheType::decorator::<LruCache>().is::<FifoCache>());
    }

    #[test]
    fn test_base_factory_builds_cache_with_id() {
        let factory = CacheType::perpetual().base_factory().unwrap();
        let cache = factory("orders").unwrap();
        assert_eq!(cache.id(), "orders");
    }
}
