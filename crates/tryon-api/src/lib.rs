//! Axum HTTP API server for virtual try-on.
//!
//! This crate provides:
//! - The inference proxy at `POST /api/tryon`
//! - A server-side pose overlay at `POST /api/overlay`
//! - Security headers, request ids and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
