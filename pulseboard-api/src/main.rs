//! Pulseboard API server entry point.
//!
//! Bootstraps logging and configuration, builds the connection pool,
//! and starts the Axum HTTP server.

use std::net::SocketAddr;

use axum::Router;
use tracing_subscriber::EnvFilter;

use pulseboard_api::{create_api_router, ApiConfig, ApiError, ApiResult, DbClient, DbConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pulseboard_api=debug")),
        )
        .init();

    let db_config = DbConfig::from_env();
    db_config.ensure_password()?;
    let db = DbClient::from_config(&db_config)?;

    let api_config = ApiConfig::from_env();
    let app: Router = create_api_router(db, &api_config);

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "starting pulseboard API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.bind_port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::validation_failed(format!("Invalid bind address {}: {}", addr, e)))
}
