//! Cache Assembler - builds decorated cache chains from declarative specs
//!
//! A `CacheSpec` names a base storage strategy, custom decorators and the
//! standard options (capacity, scheduled clearing, serialization, blocking).
//! `CacheSpec::build` turns it into one layered `Cache`.

pub mod api;
pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use builder::CacheSpec;
pub use cache::{Cache, CacheType};
pub use config::Config;
pub use error::{CacheError, Result};
