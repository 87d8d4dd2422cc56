//! Standard Decorator Pipeline
//!
//! The fixed, ordered stages applied on top of the standard in-memory strategy
//! after any custom decorators. Order, outward from the base:
//!
//! 1. capacity (binds `size` on the current head, no wrapping)
//! 2. scheduled clear, when a clear interval is set
//! 3. serialization, when read-write
//! 4. logging, always
//! 5. synchronization, always
//! 6. blocking, when blocking
//!
//! Logging sits above the business layers so it sees real hits and misses.
//! Synchronization sits above logging so the counters are not raced, and below
//! blocking so per-key admission runs against an already synchronized chain.

use tracing::debug;

use crate::builder::CacheSpec;
use crate::cache::decorators::{
    BlockingCache, LoggingCache, ScheduledCache, SerializedCache, SynchronizedCache,
};
use crate::cache::{Cache, PropertyValue};
use crate::error::Result;

type Predicate = fn(&CacheSpec) -> bool;
type Apply = fn(&CacheSpec, Box<dyn Cache>) -> Result<Box<dyn Cache>>;

// == Standard Decorator ==
/// One stage of the standard pipeline: when it runs and what it does.
#[derive(Clone, Copy)]
pub struct StandardDecorator {
    name: &'static str,
    enabled: Predicate,
    apply: Apply,
}

impl StandardDecorator {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this stage applies to `spec`.
    pub fn is_enabled(&self, spec: &CacheSpec) -> bool {
        (self.enabled)(spec)
    }
}

impl std::fmt::Debug for StandardDecorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardDecorator")
            .field("name", &self.name)
            .finish()
    }
}

/// The standard stages in application order.
pub const STANDARD_DECORATORS: [StandardDecorator; 6] = [
    StandardDecorator {
        name: "size",
        enabled: has_size,
        apply: bind_size,
    },
    StandardDecorator {
        name: "scheduled",
        enabled: has_clear_interval,
        apply: wrap_scheduled,
    },
    StandardDecorator {
        name: "serialized",
        enabled: is_read_write,
        apply: wrap_serialized,
    },
    StandardDecorator {
        name: "logging",
        enabled: always,
        apply: wrap_logging,
    },
    StandardDecorator {
        name: "synchronized",
        enabled: always,
        apply: wrap_synchronized,
    },
    StandardDecorator {
        name: "blocking",
        enabled: is_blocking,
        apply: wrap_blocking,
    },
];

/// Runs every enabled stage over `cache`, in order.
pub(crate) fn apply_standard_decorators(
    spec: &CacheSpec,
    mut cache: Box<dyn Cache>,
) -> Result<Box<dyn Cache>> {
    for stage in STANDARD_DECORATORS.iter().filter(|stage| stage.is_enabled(spec)) {
        debug!(cache = spec.id(), stage = stage.name, "applying standard decorator");
        cache = (stage.apply)(spec, cache)?;
    }
    Ok(cache)
}

// Capacity is already typed, so it skips string coercion.
fn bind_size(spec: &CacheSpec, mut cache: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
    if let (Some(size), Some(target)) = (spec.size, cache.configurable()) {
        if target.setter_kind("size").is_some() {
            target.set_property("size", PropertyValue::Int(size))?;
        }
    }
    Ok(cache)
}

fn has_size(spec: &CacheSpec) -> bool {
    spec.size.is_some()
}

fn has_clear_interval(spec: &CacheSpec) -> bool {
    spec.clear_interval.is_some()
}

fn is_read_write(spec: &CacheSpec) -> bool {
    spec.read_write
}

fn is_blocking(spec: &CacheSpec) -> bool {
    spec.blocking
}

fn always(_: &CacheSpec) -> bool {
    true
}

fn wrap_scheduled(spec: &CacheSpec, cache: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
    let mut scheduled = ScheduledCache::new(cache);
    if let Some(interval) = spec.clear_interval {
        scheduled.set_clear_interval(interval);
    }
    Ok(Box::new(scheduled))
}

fn wrap_serialized(_: &CacheSpec, cache: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
    Ok(Box::new(SerializedCache::new(cache)))
}

fn wrap_logging(_: &CacheSpec, cache: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
    Ok(Box::new(LoggingCache::new(cache)))
}

fn wrap_synchronized(_: &CacheSpec, cache: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
    Ok(Box::new(SynchronizedCache::new(cache)))
}

fn wrap_blocking(spec: &CacheSpec, cache: Box<dyn Cache>) -> Result<Box<dyn Cache>> {
    let mut blocking = BlockingCache::new(cache);
    blocking.set_timeout(spec.blocking_timeout);
    Ok(Box::new(blocking))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn names() -> Vec<&'static str> {
        STANDARD_DECORATORS.iter().map(|stage| stage.name()).collect()
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            names(),
            vec!["size", "scheduled", "serialized", "logging", "synchronized", "blocking"]
        );
    }

    #[test]
    fn test_minimal_spec_enables_only_unconditional_stages() {
        let spec = CacheSpec::new("users").read_write(false);

        let enabled: Vec<_> = STANDARD_DECORATORS
            .iter()
            .filter(|stage| stage.is_enabled(&spec))
            .map(|stage| stage.name())
            .collect();

        assert_eq!(enabled, vec!["logging", "synchronized"]);
    }

    #[test]
    fn test_full_spec_enables_every_stage() {
        let spec = CacheSpec::new("users")
            .size(10)
            .clear_interval(Duration::from_secs(1))
            .read_write(true)
            .blocking(true);

        assert!(STANDARD_DECORATORS.iter().all(|stage| stage.is_enabled(&spec)));
    }
}
