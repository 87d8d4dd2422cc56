//! API Module
//!
//! HTTP handlers and routing for serving one assembled cache.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /clear` - Remove every entry
//! - `GET /stats` - Get hit/miss statistics and the layer chain
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
