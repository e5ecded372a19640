//! API Handlers
//!
//! HTTP request handlers for each ops endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::cache::CacheManager;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the one cache instance constructed at process start; handlers
/// and the embedding application share it by reference.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache instance
    pub cache: Arc<CacheManager>,
}

impl AppState {
    /// Creates a new AppState around a shared cache instance.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /stats
///
/// Returns a point-in-time snapshot of cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for POST /invalidate
///
/// Removes every entry in the requested category (key prefix).
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.cache.invalidate_category(&req.prefix)?;

    Ok(Json(InvalidateResponse::new(req.prefix, removed)))
}

/// Handler for POST /clear
///
/// Removes all entries. Used sparingly (admin reset).
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.clear();

    Json(ClearResponse::new(removed))
}

/// Handler for GET /health
///
/// Returns health status of the service.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
