//! Error types for cache assembly and cache operations
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Boxed cause carried by errors raised inside factories and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for building and using caches.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Base type has no construction path taking a single id
    #[error(
        "Invalid base cache implementation ({type_name}) for cache '{id}'. \
         Base cache implementations must be constructible from a single id"
    )]
    InvalidBaseImplementation { id: String, type_name: &'static str },

    /// Decorator type has no construction path taking a single inner cache
    #[error(
        "Invalid cache decorator ({type_name}) for cache '{id}'. \
         Cache decorators must be constructible from a single inner cache"
    )]
    InvalidDecorator { id: String, type_name: &'static str },

    /// Decorator that only works at its fixed place in the standard pipeline
    #[error(
        "Cache decorator ({type_name}) for cache '{id}' cannot be applied as a custom \
         decorator; enable it through the cache options instead"
    )]
    StandardOnlyDecorator { id: String, type_name: &'static str },

    /// Settable attribute declares a type outside the supported kinds
    #[error("Unsupported property type for cache '{id}': '{property}' of type {kind}")]
    UnsupportedPropertyType {
        id: String,
        property: String,
        kind: String,
    },

    /// Property value could not be parsed as the declared kind
    #[error("Invalid value '{value}' for property '{property}' of type {kind}: {reason}")]
    InvalidPropertyValue {
        property: String,
        kind: String,
        value: String,
        reason: String,
    },

    /// Post-construction initialization hook failed
    #[error("Failed cache initialization for '{id}' on '{type_name}'")]
    CacheInitializationFailed {
        id: String,
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// Construction path was found but rejected its argument
    #[error("Could not instantiate cache type ({type_name}) for cache '{id}'")]
    InstantiationFailed {
        id: String,
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// Value could not be serialized or deserialized by the serialization layer
    #[error("Serialization error in cache '{id}': {reason}")]
    Serialization { id: String, reason: String },

    /// Timed out waiting for another caller to populate a key
    #[error("Couldn't get a lock in {timeout_ms}ms for key '{key}' in cache '{id}'")]
    LockTimeout {
        id: String,
        key: String,
        timeout_ms: u128,
    },

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true for errors raised while assembling a cache.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidBaseImplementation { .. }
                | CacheError::InvalidDecorator { .. }
                | CacheError::StandardOnlyDecorator { .. }
                | CacheError::UnsupportedPropertyType { .. }
                | CacheError::InvalidPropertyValue { .. }
                | CacheError::CacheInitializationFailed { .. }
                | CacheError::InstantiationFailed { .. }
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::LockTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
