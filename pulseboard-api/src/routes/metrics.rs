//! Dashboard-wide routes: daily active users and the overview.
//!
//! Both endpoints fan out over every discovered feed table. Fetches
//! run concurrently and each table's failure degrades that table to an
//! error status instead of aborting the batch - partial success is the
//! expected steady state.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use pulseboard_core::{
    daily_active_users, sort_summaries, summarize_user, window::now_local, DauBucket,
    FetchStatus, RecencyWindow, UserActivity, UserSummary,
};

use crate::db::DbClient;
use crate::error::ApiResult;
use crate::routes::tables::fetch_normalized;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct RangeQuery {
    /// Recency window (week, month, 3months, 6months, year, all).
    #[param(value_type = Option<String>)]
    pub range: Option<RecencyWindow>,
}

/// Response for `GET /metrics/daily-active-users`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DauResponse {
    pub success: bool,
    #[schema(value_type = String)]
    pub range: RecencyWindow,
    #[schema(value_type = Vec<Object>)]
    pub days: Vec<DauBucket>,
}

/// Dashboard totals across all users.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OverviewTotals {
    pub total_users: usize,
    pub total_interactions: u64,
    /// Users whose fetch succeeded with at least one row.
    pub users_with_activity: usize,
    /// Distinct users with at least one event today (display-zone day).
    pub active_today: u64,
}

/// Response for `GET /overview`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OverviewResponse {
    pub success: bool,
    pub totals: OverviewTotals,
    #[schema(value_type = Vec<Object>)]
    pub users: Vec<UserSummary>,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct MetricsState {
    pub db: DbClient,
}

// ============================================================================
// FAN-OUT
// ============================================================================

/// One table's fetch outcome for dashboard computation.
struct TableFetch {
    table_name: String,
    owner_id: String,
    status: FetchStatus,
    rows: Vec<pulseboard_core::JsonMap>,
    error: Option<String>,
}

/// Fetch every discovered feed table concurrently. A table that fails
/// validation or fetching is kept with error status so the dashboard
/// can still show the owner.
async fn fetch_all_tables(db: &DbClient) -> ApiResult<Vec<TableFetch>> {
    let names = db.list_feed_tables().await?;
    tracing::info!(count = names.len(), "loading dashboard data");

    let fetches = names.iter().map(|name| load_table(db, name));
    Ok(join_all(fetches).await)
}

async fn load_table(db: &DbClient, name: &str) -> TableFetch {
    // fetch_normalized re-runs the allow-list: discovery only filters
    // on the suffix, so a name using characters outside the allow-list
    // still degrades to an error entry here.
    let owner_id = name
        .strip_suffix(pulseboard_core::FEED_TABLE_SUFFIX)
        .unwrap_or(name)
        .to_string();

    match fetch_normalized(db, name).await {
        Ok((table, _columns, rows)) => {
            tracing::debug!(table = %table, rows = rows.len(), "table loaded");
            TableFetch {
                table_name: table.into_string(),
                owner_id,
                status: FetchStatus::Success,
                rows,
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!(table = name, error = %err, "table fetch failed");
            TableFetch {
                table_name: name.to_string(),
                owner_id,
                status: FetchStatus::Error,
                rows: Vec::new(),
                error: Some(err.message),
            }
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /metrics/daily-active-users - distinct active owners per day.
#[utoipa::path(
    get,
    path = "/metrics/daily-active-users",
    tag = "Metrics",
    params(RangeQuery),
    responses(
        (status = 200, description = "Daily active user series", body = DauResponse),
        (status = 500, description = "Discovery failed"),
    ),
)]
pub async fn get_daily_active_users(
    State(state): State<Arc<MetricsState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<DauResponse>> {
    let range = query.range.unwrap_or_default();
    let fetches = fetch_all_tables(&state.db).await?;

    let users: Vec<UserActivity> = fetches
        .into_iter()
        .map(|fetch| UserActivity {
            owner_id: fetch.owner_id,
            status: fetch.status,
            events: fetch.rows,
        })
        .collect();

    let days = daily_active_users(&users, range);

    Ok(Json(DauResponse {
        success: true,
        range,
        days,
    }))
}

/// GET /overview - per-user summaries plus dashboard totals.
#[utoipa::path(
    get,
    path = "/overview",
    tag = "Metrics",
    responses(
        (status = 200, description = "Dashboard overview", body = OverviewResponse),
        (status = 500, description = "Discovery failed"),
    ),
)]
pub async fn get_overview(
    State(state): State<Arc<MetricsState>>,
) -> ApiResult<Json<OverviewResponse>> {
    let fetches = fetch_all_tables(&state.db).await?;

    let mut summaries: Vec<UserSummary> = fetches
        .iter()
        .map(|fetch| {
            summarize_user(
                &fetch.owner_id,
                &fetch.table_name,
                fetch.status,
                &fetch.rows,
                fetch.error.clone(),
            )
        })
        .collect();
    sort_summaries(&mut summaries);

    let users: Vec<UserActivity> = fetches
        .into_iter()
        .map(|fetch| UserActivity {
            owner_id: fetch.owner_id,
            status: fetch.status,
            events: fetch.rows,
        })
        .collect();

    let today = now_local().date().format("%Y-%m-%d").to_string();
    let active_today = daily_active_users(&users, RecencyWindow::Week)
        .iter()
        .find(|day| day.date == today)
        .map(|day| day.active_users)
        .unwrap_or(0);

    let totals = OverviewTotals {
        total_users: summaries.len(),
        total_interactions: summaries.iter().map(|s| s.total_interactions).sum(),
        users_with_activity: summaries
            .iter()
            .filter(|s| s.status == FetchStatus::Success && s.total_interactions > 0)
            .count(),
        active_today,
    };

    Ok(Json(OverviewResponse {
        success: true,
        totals,
        users: summaries,
    }))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the metrics router.
pub fn create_router(db: DbClient) -> Router {
    let state = Arc::new(MetricsState { db });

    Router::new()
        .route("/metrics/daily-active-users", get(get_daily_active_users))
        .route("/overview", get(get_overview))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dau_response_wire_shape() {
        let response = DauResponse {
            success: true,
            range: RecencyWindow::Month,
            days: vec![DauBucket {
                date: "2024-06-10".to_string(),
                active_users: 2,
                total_users: 3,
            }],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["range"], json!("month"));
        assert_eq!(value["days"][0]["active_users"], json!(2));
        assert_eq!(value["days"][0]["total_users"], json!(3));
    }

    #[test]
    fn range_query_defaults_to_month() {
        let query: RangeQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.range.unwrap_or_default(), RecencyWindow::Month);
    }
}
