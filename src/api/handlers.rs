//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{layers, Cache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the assembled cache chain. Thread safety comes from the chain's own
/// synchronization layer.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    /// Creates a new AppState serving the given cache.
    pub fn new(cache: Box<dyn Cache>) -> Self {
        Self {
            cache: Arc::from(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the cache declared by the Config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = config.cache_spec()?.build()?;
        Ok(Self::new(cache))
    }
}

// Cache layers may block (locks, single-flight waits), so calls leave the
// async workers.
async fn with_cache<T, F>(state: &AppState, op: F) -> Result<T>
where
    F: FnOnce(&dyn Cache) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let cache = Arc::clone(&state.cache);
    tokio::task::spawn_blocking(move || op(cache.as_ref()))
        .await
        .map_err(|e| CacheError::Internal(e.to_string()))?
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = req.key.clone();
    with_cache(&state, move |cache| cache.put_object(&req.key, req.value)).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = with_cache(&state, move |cache| {
        let value = cache.get_object(&lookup)?;
        if value.is_none() {
            // Nothing will compute this value, so give up the key's admission
            cache.release(&lookup);
        }
        Ok(value)
    })
    .await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = key.clone();
    let removed = with_cache(&state, move |cache| cache.remove_object(&target)).await?;

    match removed {
        Some(_) => Ok(Json(DeleteResponse::new(key))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    with_cache(&state, |cache| cache.clear()).await?;
    Ok(Json(ClearResponse::new(state.cache.id())))
}

/// Handler for GET /stats
///
/// Returns hit/miss statistics, the entry count and the layer chain.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let (stats, size) = with_cache(&state, |cache| {
        Ok((cache.stats().unwrap_or_default(), cache.size()?))
    })
    .await?;

    let chain = layers(state.cache.as_ref())
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Json(StatsResponse::new(state.cache.id(), stats, size, chain)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
