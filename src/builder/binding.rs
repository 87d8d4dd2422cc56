//! Property Binding
//!
//! Applies string properties to the settable attributes a cache layer exposes,
//! then runs the layer's initialization hook.

use std::collections::BTreeMap;

use tracing::trace;

use crate::cache::Cache;
use crate::error::{CacheError, Result};

// == Bind Properties ==
/// Binds every property whose name matches an attribute of `layer`.
///
/// Properties without a matching attribute are skipped: they may target
/// another layer of the chain.
pub(crate) fn bind_properties(
    id: &str,
    properties: &BTreeMap<String, String>,
    layer: &mut dyn Cache,
) -> Result<()> {
    let type_name = layer.kind();

    if let Some(target) = layer.configurable() {
        for (name, raw) in properties {
            let Some(kind) = target.setter_kind(name) else {
                continue;
            };

            let value = kind.coerce(id, name, raw)?;
            trace!(cache = id, layer = type_name, property = %name, ?value, "binding property");
            target.set_property(name, value)?;
        }
    }

    if let Some(hook) = layer.initializer() {
        hook.initialize()
            .map_err(|source| CacheError::CacheInitializationFailed {
                id: id.to_string(),
                type_name,
                source,
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Configurable, Initialize, PropertyKind, PropertyValue};
    use crate::error::BoxError;
    use serde_json::Value;

    /// Records every typed assignment it receives.
    #[derive(Default)]
    struct Recorder {
        assigned: Vec<(String, PropertyValue)>,
        initialized: bool,
        fail_init: bool,
    }

    impl Cache for Recorder {
        fn id(&self) -> &str {
            "recorder"
        }
        fn put_object(&self, _key: &str, _value: Value) -> Result<()> {
            Ok(())
        }
        fn get_object(&self, _key: &str) -> Result<Option<Value>> {
            Ok(None)
        }
        fn remove_object(&self, _key: &str) -> Result<Option<Value>> {
            Ok(None)
        }
        fn clear(&self) -> Result<()> {
            Ok(())
        }
        fn size(&self) -> Result<usize> {
            Ok(0)
        }
        fn configurable(&mut self) -> Option<&mut dyn Configurable> {
            Some(self)
        }
        fn initializer(&mut self) -> Option<&mut dyn Initialize> {
            Some(self)
        }
    }

    impl Configurable for Recorder {
        fn setter_kind(&self, name: &str) -> Option<PropertyKind> {
            match name {
                "host" => Some(PropertyKind::Str),
                "port" => Some(PropertyKind::Short),
                "ttl" => Some(PropertyKind::Long),
                "ratio" => Some(PropertyKind::Double),
                "compress" => Some(PropertyKind::Bool),
                "servers" => Some(PropertyKind::Other("Vec<SocketAddr>")),
                _ => None,
            }
        }

        fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
            self.assigned.push((name.to_string(), value));
            Ok(())
        }
    }

    impl Initialize for Recorder {
        fn initialize(&mut self) -> std::result::Result<(), BoxError> {
            if self.fail_init {
                return Err("pool exhausted".into());
            }
            self.initialized = true;
            Ok(())
        }
    }

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_binds_typed_values_and_initializes() {
        let mut layer = Recorder::default();
        let properties = props(&[
            ("host", "db1"),
            ("port", "5432"),
            ("ttl", "60000"),
            ("ratio", "0.75"),
            ("compress", "True"),
        ]);

        bind_properties("users", &properties, &mut layer).unwrap();

        assert!(layer.initialized);
        assert_eq!(
            layer.assigned,
            vec![
                ("compress".to_string(), PropertyValue::Bool(true)),
                ("host".to_string(), PropertyValue::Str("db1".to_string())),
                ("port".to_string(), PropertyValue::Short(5432)),
                ("ratio".to_string(), PropertyValue::Double(0.75)),
                ("ttl".to_string(), PropertyValue::Long(60000)),
            ]
        );
    }

    #[test]
    fn test_unknown_properties_are_skipped() {
        let mut layer = Recorder::default();

        bind_properties("users", &props(&[("nope", "1")]), &mut layer).unwrap();

        assert!(layer.assigned.is_empty());
        assert!(layer.initialized);
    }

    #[test]
    fn test_unsupported_kind_names_property_and_cache() {
        let mut layer = Recorder::default();

        let err = bind_properties("users", &props(&[("servers", "a:1")]), &mut layer).unwrap_err();

        match err {
            CacheError::UnsupportedPropertyType { id, property, kind } => {
                assert_eq!(id, "users");
                assert_eq!(property, "servers");
                assert_eq!(kind, "Vec<SocketAddr>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!layer.initialized);
    }

    #[test]
    fn test_unparsable_value_fails() {
        let mut layer = Recorder::default();

        let err = bind_properties("users", &props(&[("port", "http")]), &mut layer).unwrap_err();

        assert!(matches!(err, CacheError::InvalidPropertyValue { .. }));
    }

    #[test]
    fn test_initialization_failure_is_wrapped() {
        let mut layer = Recorder {
            fail_init: true,
            ..Recorder::default()
        };

        let err = bind_properties("users", &BTreeMap::new(), &mut layer).unwrap_err();

        match err {
            CacheError::CacheInitializationFailed { id, type_name, source } => {
                assert_eq!(id, "users");
                assert!(type_name.ends_with("Recorder"));
                assert_eq!(source.to_string(), "pool exhausted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
