//! Cache Assembly
//!
//! Turns a declarative `CacheSpec` into a finished, fully decorated cache.
//!
//! # Build Sequence
//! 1. Resolve defaults (standard strategy, plus LRU when nothing else is asked for)
//! 2. Instantiate the base from its id
//! 3. Bind properties onto the base
//! 4. For the standard strategy only: wrap each custom decorator (binding
//!    properties on each), then apply the standard pipeline
//!
//! Blocking is only available as a standard stage. Below the synchronization
//! layer a waiting lookup would keep the whole chain locked, so it is rejected
//! as a custom decorator.
//! 5. Otherwise: wrap with logging unless the base already records hits
//!
//! Any failure aborts the build; nothing is returned half-built.

mod binding;
mod pipeline;

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::decorators::{BlockingCache, LoggingCache, LruCache};
use crate::cache::{layers, Cache, CacheType, DecoratorFactory, PerpetualCache};
use crate::error::{CacheError, Result};

pub use pipeline::{StandardDecorator, STANDARD_DECORATORS};

// == Cache Spec ==
/// Declarative description of one cache.
///
/// Configured through consuming setters, then turned into a cache by
/// [`CacheSpec::build`]. Building does not modify the spec, so equal specs
/// always produce chains with the same layers in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSpec {
    pub(crate) id: String,
    pub(crate) implementation: Option<CacheType>,
    pub(crate) decorators: Vec<CacheType>,
    pub(crate) size: Option<i32>,
    pub(crate) clear_interval: Option<Duration>,
    pub(crate) read_write: bool,
    pub(crate) blocking: bool,
    pub(crate) blocking_timeout: Option<Duration>,
    pub(crate) properties: BTreeMap<String, String>,
}

impl CacheSpec {
    // == Constructor ==
    /// Creates a spec for the cache identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            implementation: None,
            decorators: Vec::new(),
            size: None,
            clear_interval: None,
            read_write: false,
            blocking: false,
            blocking_timeout: None,
            properties: BTreeMap::new(),
        }
    }

    // == Setters ==
    /// Storage strategy at the bottom of the chain.
    pub fn implementation(mut self, implementation: CacheType) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// Appends a custom decorator. Decorators wrap in insertion order.
    pub fn add_decorator(mut self, decorator: CacheType) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Capacity hint bound on the outermost custom decorator that accepts it.
    pub fn size(mut self, size: i32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn clear_interval(mut self, interval: Duration) -> Self {
        self.clear_interval = Some(interval);
        self
    }

    pub fn read_write(mut self, read_write: bool) -> Self {
        self.read_write = read_write;
        self
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Bounds how long a blocked lookup waits. Only used when blocking.
    pub fn blocking_timeout(mut self, timeout: Duration) -> Self {
        self.blocking_timeout = Some(timeout);
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Replaces all properties.
    pub fn properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // == Resolve Defaults ==
    /// Returns the effective base type and custom decorator list.
    fn resolve_defaults(&self) -> (CacheType, Vec<CacheType>) {
        match self.implementation {
            Some(implementation) => (implementation, self.decorators.clone()),
            None => {
                let mut decorators = self.decorators.clone();
                if decorators.is_empty() {
                    decorators.push(CacheType::decorator::<LruCache>());
                }
                (CacheType::perpetual(), decorators)
            }
        }
    }

    // == Validate ==
    /// Checks every construction path the build would use, without building.
    ///
    /// `build` performs the same checks; this lets callers fail at
    /// declaration time instead.
    pub fn validate(&self) -> Result<()> {
        let (implementation, decorators) = self.resolve_defaults();
        if implementation.base_factory().is_none() {
            return Err(self.invalid_base(implementation));
        }
        if implementation.is::<PerpetualCache>() {
            for decorator in &decorators {
                self.check_custom_decorator(*decorator)?;
            }
        }
        Ok(())
    }

    // == Build ==
    /// Assembles the cache described by this spec.
    pub fn build(&self) -> Result<Box<dyn Cache>> {
        let (implementation, decorators) = self.resolve_defaults();

        let mut cache = self.new_base_cache(implementation)?;
        binding::bind_properties(&self.id, &self.properties, cache.as_mut())?;

        // Custom implementations manage their own behavior and are never
        // wrapped beyond logging.
        if implementation.is::<PerpetualCache>() {
            for decorator in decorators {
                cache = self.new_decorator(decorator, cache)?;
                binding::bind_properties(&self.id, &self.properties, cache.as_mut())?;
            }
            cache = pipeline::apply_standard_decorators(self, cache)?;
        } else if cache.stats().is_none() {
            debug!(cache = %self.id, "wrapping custom implementation with logging");
            cache = Box::new(LoggingCache::new(cache));
        }

        info!(cache = %self.id, layers = ?layers(cache.as_ref()), "cache built");
        Ok(cache)
    }

    fn new_base_cache(&self, implementation: CacheType) -> Result<Box<dyn Cache>> {
        let factory = implementation
            .base_factory()
            .ok_or_else(|| self.invalid_base(implementation))?;

        factory(&self.id).map_err(|source| CacheError::InstantiationFailed {
            id: self.id.clone(),
            type_name: implementation.name(),
            source,
        })
    }

    fn check_custom_decorator(&self, decorator: CacheType) -> Result<DecoratorFactory> {
        if decorator.is::<BlockingCache>() {
            return Err(CacheError::StandardOnlyDecorator {
                id: self.id.clone(),
                type_name: decorator.name(),
            });
        }
        decorator
            .decorator_factory()
            .ok_or_else(|| self.invalid_decorator(decorator))
    }

    fn new_decorator(&self, decorator: CacheType, inner: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
        let factory = self.check_custom_decorator(decorator)?;

        debug!(cache = %self.id, decorator = decorator.name(), "applying custom decorator");
        factory(inner).map_err(|source| CacheError::InstantiationFailed {
            id: self.id.clone(),
            type_name: decorator.name(),
            source,
        })
    }

    fn invalid_base(&self, implementation: CacheType) -> CacheError {
        CacheError::InvalidBaseImplementation {
            id: self.id.clone(),
            type_name: implementation.name(),
        }
    }

    fn invalid_decorator(&self, decorator: CacheType) -> CacheError {
        CacheError::InvalidDecorator {
            id: self.id.clone(),
            type_name: decorator.name(),
        }
    }
}
