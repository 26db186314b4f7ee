//! Pulseboard API - HTTP layer for the activity dashboard.
//!
//! Exposes REST endpoints (Axum) over the aggregation primitives in
//! `pulseboard-core`. The server discovers per-user feed tables in
//! PostgreSQL, fetches recent rows with normalized timestamps, and
//! serves daily activity and daily-active-user series.

pub mod config;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
