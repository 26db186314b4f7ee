//! REST route handlers.
//!
//! - Feed tables: discovery, row fetch, per-table activity
//! - Metrics: daily active users and the dashboard overview
//! - Health checks at /health/* (public)
//! - OpenAPI spec at /openapi.json
//! - CORS support for the browser dashboard

pub mod health;
pub mod metrics;
pub mod tables;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::db::DbClient;
use crate::openapi::ApiDoc;

pub use health::create_router as health_router;
pub use metrics::create_router as metrics_router;
pub use tables::create_router as tables_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// The API is read-only so only GET and OPTIONS are allowed. An empty
/// origin list means development mode, any origin is accepted.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if config.cors_restricted() {
        tracing::info!(origins = ?config.cors_origins, "CORS restricted to configured origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    } else {
        tracing::info!("CORS open, allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    }
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// Table and metrics routes live under /api, health checks under
/// /health, and the OpenAPI document at /openapi.json.
pub fn create_api_router(db: DbClient, api_config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .merge(tables::create_router(db.clone()))
        .merge(metrics::create_router(db.clone()));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::create_router(db))
        .route("/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_all_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(|p| p.as_str()).collect();

        assert!(paths.contains(&"/tables"));
        assert!(paths.contains(&"/tables/{table_name}"));
        assert!(paths.contains(&"/tables/{table_name}/activity"));
        assert!(paths.contains(&"/metrics/daily-active-users"));
        assert!(paths.contains(&"/overview"));
        assert!(paths.contains(&"/health/ping"));
        assert!(paths.contains(&"/health/ready"));
    }
}
