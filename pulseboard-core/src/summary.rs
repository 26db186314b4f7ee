//! Per-user interaction summaries for the dashboard overview.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::{ACTION_FIELD, UNKNOWN_ACTION};
use crate::dau::FetchStatus;
use crate::timefield::resolve_timestamp;
use crate::JsonMap;

/// Aggregate statistics for one user's feed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub owner_id: String,
    pub table_name: String,
    pub total_interactions: u64,
    /// Earliest resolved activity timestamp string, when any.
    pub first_activity: Option<String>,
    /// Latest resolved activity timestamp string, when any.
    pub last_activity: Option<String>,
    pub action_breakdown: BTreeMap<String, u64>,
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Summarize one table's rows.
///
/// First/last activity compare the resolved timestamp strings
/// lexicographically, which is chronological for the normalized
/// `YYYY-MM-DD HH:MM:SS` form. Error tables keep their owner entry
/// with zero counts so the dashboard still shows the user.
pub fn summarize_user(
    owner_id: &str,
    table_name: &str,
    status: FetchStatus,
    rows: &[JsonMap],
    error_message: Option<String>,
) -> UserSummary {
    let mut action_breakdown = BTreeMap::new();
    if status == FetchStatus::Success {
        for row in rows {
            let action = match row.get(ACTION_FIELD) {
                Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
                _ => UNKNOWN_ACTION.to_string(),
            };
            *action_breakdown.entry(action).or_insert(0) += 1;
        }
    }

    let mut dates: Vec<&str> = rows
        .iter()
        .filter_map(|row| resolve_timestamp(row, None))
        .filter_map(|v| v.as_str())
        .filter(|s| !s.is_empty() && *s != "N/A")
        .collect();
    dates.sort_unstable();

    UserSummary {
        owner_id: owner_id.to_string(),
        table_name: table_name.to_string(),
        total_interactions: if status == FetchStatus::Success {
            rows.len() as u64
        } else {
            0
        },
        first_activity: dates.first().map(|s| s.to_string()),
        last_activity: dates.last().map(|s| s.to_string()),
        action_breakdown,
        status,
        error_message,
    }
}

/// Dashboard ordering: successful users by interaction count
/// descending, successes ahead of failures.
pub fn sort_summaries(summaries: &mut [UserSummary]) {
    summaries.sort_by(|a, b| {
        match (a.status == FetchStatus::Success, b.status == FetchStatus::Success) {
            (true, true) => b.total_interactions.cmp(&a.total_interactions),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => std::cmp::Ordering::Equal,
        }
    });
}
