//! Feed-table routes: discovery, row fetch, per-table activity.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use pulseboard_core::{
    action_color, action_description, bucket_daily_activity, normalize_row,
    pick_timestamp_column, DailyBucket, FeedTable, JsonMap, RecencyWindow,
};

use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// TYPES
// ============================================================================

/// Response for `GET /tables`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TablesResponse {
    pub success: bool,
    pub tables: Vec<String>,
    pub count: usize,
}

/// Response for `GET /tables/{table_name}`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TableDataResponse {
    pub success: bool,
    #[serde(rename = "tableName")]
    pub table_name: String,
    pub message: String,
    /// Normalized rows, open-ended source schema.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonMap>,
    pub columns: Vec<String>,
    #[serde(rename = "rowCount")]
    pub row_count: usize,
}

/// Query parameters for the activity endpoint.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct ActivityQuery {
    /// Recency window (week, month, 3months, 6months, year, all).
    #[param(value_type = Option<String>)]
    pub range: Option<RecencyWindow>,
    /// Row field to read timestamps from, overriding the default.
    #[serde(rename = "dateField")]
    pub date_field: Option<String>,
}

/// Presentation metadata for one action label.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ActionLabelInfo {
    pub description: String,
    pub color: String,
}

/// Response for `GET /tables/{table_name}/activity`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TableActivityResponse {
    pub success: bool,
    #[serde(rename = "tableName")]
    pub table_name: String,
    #[schema(value_type = String)]
    pub range: RecencyWindow,
    #[schema(value_type = Vec<Object>)]
    pub days: Vec<DailyBucket>,
    /// Description/color metadata for every action label present.
    pub labels: BTreeMap<String, ActionLabelInfo>,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct TablesState {
    pub db: DbClient,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /tables - discover feed tables.
#[utoipa::path(
    get,
    path = "/tables",
    tag = "Tables",
    responses(
        (status = 200, description = "Discovered feed tables", body = TablesResponse),
        (status = 500, description = "Discovery failed"),
    ),
)]
pub async fn list_tables(State(state): State<Arc<TablesState>>) -> ApiResult<Json<TablesResponse>> {
    let tables = state.db.list_feed_tables().await?;
    tracing::info!(count = tables.len(), "discovered feed tables");

    Ok(Json(TablesResponse {
        success: true,
        count: tables.len(),
        tables,
    }))
}

/// GET /tables/{table_name} - fetch and normalize recent rows.
#[utoipa::path(
    get,
    path = "/tables/{table_name}",
    tag = "Tables",
    params(("table_name" = String, Path, description = "Feed table name")),
    responses(
        (status = 200, description = "Recent rows, timestamps normalized", body = TableDataResponse),
        (status = 400, description = "Invalid table name"),
        (status = 404, description = "Table not found or has no columns"),
        (status = 500, description = "Fetch failed"),
    ),
)]
pub async fn get_table_data(
    State(state): State<Arc<TablesState>>,
    Path(table_name): Path<String>,
) -> ApiResult<Json<TableDataResponse>> {
    let (table, columns, data) = fetch_normalized(&state.db, &table_name).await?;

    tracing::info!(
        table = %table,
        rows = data.len(),
        columns = columns.len(),
        "fetched table data"
    );

    Ok(Json(TableDataResponse {
        success: true,
        message: format!(
            "Successfully pulled {} rows from {} table",
            data.len(),
            table.as_str()
        ),
        table_name: table.into_string(),
        row_count: data.len(),
        data,
        columns,
    }))
}

/// GET /tables/{table_name}/activity - daily activity buckets for one
/// table.
#[utoipa::path(
    get,
    path = "/tables/{table_name}/activity",
    tag = "Tables",
    params(
        ("table_name" = String, Path, description = "Feed table name"),
        ActivityQuery,
    ),
    responses(
        (status = 200, description = "Daily activity series", body = TableActivityResponse),
        (status = 400, description = "Invalid table name"),
        (status = 404, description = "Table not found or has no columns"),
    ),
)]
pub async fn get_table_activity(
    State(state): State<Arc<TablesState>>,
    Path(table_name): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<TableActivityResponse>> {
    let range = query.range.unwrap_or_default();
    let (table, _columns, data) = fetch_normalized(&state.db, &table_name).await?;

    let days = bucket_daily_activity(&data, range, query.date_field.as_deref());
    let labels = label_metadata(&days);

    Ok(Json(TableActivityResponse {
        success: true,
        table_name: table.into_string(),
        range,
        days,
        labels,
    }))
}

// ============================================================================
// SHARED FETCH PATH
// ============================================================================

/// Validate, introspect, fetch, and normalize one table. This is the
/// single fetch path shared by the table routes and the dashboard
/// fan-out in the metrics routes.
pub async fn fetch_normalized(
    db: &DbClient,
    table_name: &str,
) -> ApiResult<(FeedTable, Vec<String>, Vec<JsonMap>)> {
    // Allow-list gate: nothing below runs for a hostile name.
    let table = FeedTable::parse(table_name).map_err(ApiError::from)?;

    let columns = db.table_columns(&table).await?;
    if columns.is_empty() {
        return Err(ApiError::table_not_found(table.as_str()));
    }

    let date_column = pick_timestamp_column(&columns);
    tracing::debug!(
        table = %table,
        date_column = ?date_column,
        "resolved timestamp column"
    );

    let rows = db.fetch_recent_rows(&table, date_column.as_deref()).await?;
    let data = rows
        .into_iter()
        .map(|row| normalize_row(row, date_column.as_deref()))
        .collect();

    Ok((table, columns, data))
}

fn label_metadata(days: &[DailyBucket]) -> BTreeMap<String, ActionLabelInfo> {
    let mut labels = BTreeMap::new();
    for bucket in days {
        for action in bucket.actions.keys() {
            labels.entry(action.clone()).or_insert_with(|| ActionLabelInfo {
                description: action_description(action).to_string(),
                color: action_color(action).to_string(),
            });
        }
    }
    labels
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the tables router.
pub fn create_router(db: DbClient) -> Router {
    let state = Arc::new(TablesState { db });

    Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/:table_name", get(get_table_data))
        .route("/tables/:table_name/activity", get(get_table_activity))
        .with_state(state)
}
