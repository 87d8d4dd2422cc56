//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check behavior that must hold for any spec or operation
//! sequence, not just the hand-picked cases in the unit tests.

use proptest::prelude::*;
use serde_json::json;
use std::time::Duration;

use crate::builder::CacheSpec;
use crate::cache::{layers, PropertyKind, PropertyValue};

// == Strategies ==
/// Generates short cache keys so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates property names no standard layer exposes
fn unknown_property_strategy() -> impl Strategy<Value = String> {
    "x[a-zA-Z0-9_]{0,16}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: i64 },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), any::<i64>()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

/// Generates specs over the standard strategy with random options
fn spec_strategy() -> impl Strategy<Value = CacheSpec> {
    (
        proptest::option::of(1i32..64),
        proptest::option::of(1u64..10_000),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(size, interval_ms, read_write, blocking)| {
            let mut spec = CacheSpec::new("prop").read_write(read_write).blocking(blocking);
            if let Some(size) = size {
                spec = spec.size(size);
            }
            if let Some(ms) = interval_ms {
                spec = spec.clear_interval(Duration::from_millis(ms));
            }
            spec
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The default LRU layer never lets the chain grow past the configured size.
    #[test]
    fn prop_capacity_never_exceeded(
        size in 1i32..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let cache = CacheSpec::new("prop").size(size).build().unwrap();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => cache.put_object(&key, json!(value)).unwrap(),
                CacheOp::Get { key } => {
                    cache.get_object(&key).unwrap();
                }
                CacheOp::Remove { key } => {
                    cache.remove_object(&key).unwrap();
                }
            }
            prop_assert!(cache.size().unwrap() <= size as usize);
        }
    }

    // Hit and miss counters account for every lookup and nothing else.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let cache = CacheSpec::new("prop").build().unwrap();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => cache.put_object(&key, json!(value)).unwrap(),
                CacheOp::Get { key } => match cache.get_object(&key).unwrap() {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Remove { key } => {
                    cache.remove_object(&key).unwrap();
                }
            }
        }

        let stats = cache.stats().unwrap();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // Building never mutates the spec, so equal specs give equal chains.
    #[test]
    fn prop_build_is_repeatable(spec in spec_strategy()) {
        let first = spec.build().unwrap();
        let second = spec.build().unwrap();

        prop_assert_eq!(layers(first.as_ref()), layers(second.as_ref()));
        prop_assert_eq!(first.id(), "prop");
    }

    // Serialized chains hand back values equal to what was stored.
    #[test]
    fn prop_read_write_preserves_values(key in key_strategy(), value in any::<i64>(), text in ".{0,32}") {
        let cache = CacheSpec::new("prop").read_write(true).build().unwrap();
        let stored = json!({ "n": value, "text": text });

        cache.put_object(&key, stored.clone()).unwrap();

        prop_assert_eq!(cache.get_object(&key).unwrap(), Some(stored));
    }

    // Properties no layer declares are skipped silently.
    #[test]
    fn prop_unknown_properties_ignored(name in unknown_property_strategy(), value in ".{0,16}") {
        let spec = CacheSpec::new("prop").property(name, value);

        prop_assert!(spec.build().is_ok());
    }

    // Every i32 round-trips through integer coercion.
    #[test]
    fn prop_int_coercion(n in any::<i32>()) {
        let value = PropertyKind::Int.coerce("prop", "size", &n.to_string()).unwrap();

        prop_assert_eq!(value, PropertyValue::Int(n));
    }

    // Anything other than "true" in some casing reads as false.
    #[test]
    fn prop_bool_coercion_is_lenient(raw in "[a-zA-Z]{0,8}") {
        let value = PropertyKind::Bool.coerce("prop", "flag", &raw).unwrap();

        prop_assert_eq!(value, PropertyValue::Bool(raw.eq_ignore_ascii_case("true")));
    }
}
