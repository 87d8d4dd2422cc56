//! Property Module
//!
//! Named, typed attributes that a cache layer can expose for configuration,
//! and the coercion of raw string values into those types.

use std::fmt;

use crate::error::{BoxError, CacheError, Result};

// == Property Kind ==
/// Declared type of a settable cache attribute.
///
/// The first eight variants form the closed set of kinds a string value can be
/// coerced into. `Other` describes any attribute whose type falls outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Str,
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
    Bool,
    /// Any other type, named for diagnostics
    Other(&'static str),
}

impl PropertyKind {
    // == Coerce ==
    /// Parses `raw` into a value of this kind for the cache `id`.
    ///
    /// Booleans follow the lenient rule: `"true"` in any case is true, every
    /// other string is false. `Other` kinds fail with `UnsupportedPropertyType`.
    pub fn coerce(self, id: &str, property: &str, raw: &str) -> Result<PropertyValue> {
        let invalid = |reason: String| CacheError::InvalidPropertyValue {
            property: property.to_string(),
            kind: self.to_string(),
            value: raw.to_string(),
            reason,
        };

        let value = match self {
            PropertyKind::Str => PropertyValue::Str(raw.to_string()),
            PropertyKind::Int => PropertyValue::Int(raw.parse().map_err(|e| invalid(format!("{e}")))?),
            PropertyKind::Long => {
                PropertyValue::Long(raw.parse().map_err(|e| invalid(format!("{e}")))?)
            }
            PropertyKind::Short => {
                PropertyValue::Short(raw.parse().map_err(|e| invalid(format!("{e}")))?)
            }
            PropertyKind::Byte => {
                PropertyValue::Byte(raw.parse().map_err(|e| invalid(format!("{e}")))?)
            }
            PropertyKind::Float => {
                PropertyValue::Float(raw.trim().parse().map_err(|e| invalid(format!("{e}")))?)
            }
            PropertyKind::Double => {
                PropertyValue::Double(raw.trim().parse().map_err(|e| invalid(format!("{e}")))?)
            }
            PropertyKind::Bool => PropertyValue::Bool(raw.eq_ignore_ascii_case("true")),
            PropertyKind::Other(type_name) => {
                return Err(CacheError::UnsupportedPropertyType {
                    id: id.to_string(),
                    property: property.to_string(),
                    kind: type_name.to_string(),
                })
            }
        };

        Ok(value)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Str => "string",
            PropertyKind::Int => "i32",
            PropertyKind::Long => "i64",
            PropertyKind::Short => "i16",
            PropertyKind::Byte => "i8",
            PropertyKind::Float => "f32",
            PropertyKind::Double => "f64",
            PropertyKind::Bool => "bool",
            PropertyKind::Other(type_name) => type_name,
        };
        f.write_str(name)
    }
}

// == Property Value ==
/// A typed value ready to be assigned to a cache attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(i8),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl PropertyValue {
    /// Returns the kind this value belongs to.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Str(_) => PropertyKind::Str,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Long(_) => PropertyKind::Long,
            PropertyValue::Short(_) => PropertyKind::Short,
            PropertyValue::Byte(_) => PropertyKind::Byte,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Double(_) => PropertyKind::Double,
            PropertyValue::Bool(_) => PropertyKind::Bool,
        }
    }

    /// Widens any integer value to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            PropertyValue::Int(v) => Some(v.into()),
            PropertyValue::Long(v) => Some(v),
            PropertyValue::Short(v) => Some(v.into()),
            PropertyValue::Byte(v) => Some(v.into()),
            _ => None,
        }
    }
}

// == Configurable ==
/// Capability of a cache layer to expose named settable attributes.
pub trait Configurable {
    /// Returns the declared kind of the attribute `name`, or None when the
    /// layer has no such attribute.
    fn setter_kind(&self, name: &str) -> Option<PropertyKind>;

    /// Assigns `value` to the attribute `name`.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()>;
}

// == Initialize ==
/// Post-construction hook run after all properties have been bound.
pub trait Initialize {
    fn initialize(&mut self) -> std::result::Result<(), BoxError>;
}

/// Builds the error for a value whose kind does not match the attribute.
pub(crate) fn mismatched(property: &str, expected: PropertyKind, value: &PropertyValue) -> CacheError {
    CacheError::InvalidPropertyValue {
        property: property.to_string(),
        kind: expected.to_string(),
        value: format!("{value:?}"),
        reason: format!("expected {expected}, got {}", value.kind()),
    }
}

/// Builds the error for a capacity that is not a positive count.
pub(crate) fn invalid_capacity(value: impl fmt::Display) -> CacheError {
    CacheError::InvalidPropertyValue {
        property: "size".to_string(),
        kind: PropertyKind::Int.to_string(),
        value: value.to_string(),
        reason: "size must be positive".to_string(),
    }
}

/// Converts a configured `size` into a capacity.
pub(crate) fn positive_capacity(size: i32) -> Result<usize> {
    usize::try_from(size)
        .ok()
        .filter(|capacity| *capacity > 0)
        .ok_or_else(|| invalid_capacity(size))
}
