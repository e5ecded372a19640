//! API Module
//!
//! HTTP handlers and routing for the cache ops endpoints.
//!
//! # Endpoints
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint
//! - `POST /invalidate` - Invalidate a key category by prefix
//! - `POST /clear` - Remove all entries

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
