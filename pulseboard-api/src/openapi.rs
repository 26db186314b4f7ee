//! OpenAPI document for the pulseboard API.
//!
//! Generated with utoipa from the route annotations and response
//! schemas. Served at /openapi.json.

use utoipa::OpenApi;

use crate::error::ErrorCode;
use crate::routes::{health, metrics, tables};

/// OpenAPI document covering every route the server exposes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pulseboard API",
        version = "0.1.0",
        description = "Read-only activity dashboard over per-user feed tables",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Tables", description = "Feed table discovery and row access"),
        (name = "Metrics", description = "Cross-user activity metrics"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        tables::list_tables,
        tables::get_table_data,
        tables::get_table_activity,
        metrics::get_daily_active_users,
        metrics::get_overview,
        health::ping,
        health::readiness,
    ),
    components(schemas(
        ErrorCode,
        tables::TablesResponse,
        tables::TableDataResponse,
        tables::TableActivityResponse,
        tables::ActionLabelInfo,
        metrics::DauResponse,
        metrics::OverviewResponse,
        metrics::OverviewTotals,
        health::ReadyResponse,
        health::ComponentHealth,
        health::HealthStatus,
    ))
)]
pub struct ApiDoc;
