//! API Routes
//!
//! Configures the Axum router with the cache ops endpoints. The
//! embedding application can mount this router; the binary serves it
//! standalone.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{clear_handler, health_handler, invalidate_handler, stats_handler, AppState};

/// Creates the ops router with all endpoints configured.
///
/// # Endpoints
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
/// - `POST /invalidate` - Invalidate a key category by prefix
/// - `POST /clear` - Remove all entries
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/clear", post(clear_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
