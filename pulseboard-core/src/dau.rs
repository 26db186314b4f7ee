//! Daily-active-user reduction.
//!
//! Collapses per-table activity into one distinct-owner count per
//! calendar day. Only successfully fetched tables contribute; a failed
//! table neither adds events nor inflates the known-user total.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::timefield::{parse_instant, resolve_timestamp};
use crate::window::{now_local, RecencyWindow};
use crate::JsonMap;

/// Outcome of fetching one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Pending,
    Error,
}

/// One table's worth of activity, tagged with its fetch outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    pub owner_id: String,
    pub status: FetchStatus,
    pub events: Vec<JsonMap>,
}

/// Distinct active users on one calendar day.
///
/// `active_users` is the cardinality of the day's owner set;
/// membership is idempotent, so duplicate events from one owner count
/// once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DauBucket {
    /// Calendar-day key, canonical `YYYY-MM-DD`.
    pub date: String,
    pub active_users: u64,
    /// Total users with a successful fetch, for ratio displays.
    pub total_users: u64,
}

/// Reduce per-user activity to daily-active-user counts within the
/// window, relative to the current time.
pub fn daily_active_users(users: &[UserActivity], window: RecencyWindow) -> Vec<DauBucket> {
    daily_active_users_at(users, window, now_local())
}

/// [`daily_active_users`] with an explicit "now", for deterministic
/// evaluation. The window cutoff applies at day granularity: a day key
/// on or after the cutoff's calendar date is kept.
pub fn daily_active_users_at(
    users: &[UserActivity],
    window: RecencyWindow,
    now: chrono::NaiveDateTime,
) -> Vec<DauBucket> {
    let cutoff_date = window
        .cutoff_at(now)
        .map(|c| c.date().format("%Y-%m-%d").to_string());

    let mut day_owners: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    let mut total_users: u64 = 0;

    for user in users {
        if user.status != FetchStatus::Success {
            continue;
        }
        total_users += 1;

        for event in &user.events {
            let Some(value) = resolve_timestamp(event, None) else {
                continue;
            };
            let Some(instant) = parse_instant(value) else {
                continue;
            };
            let key = instant.local_civil().date().format("%Y-%m-%d").to_string();
            day_owners.entry(key).or_default().insert(&user.owner_id);
        }
    }

    day_owners
        .into_iter()
        .filter(|(date, _)| match &cutoff_date {
            Some(cutoff) => date.as_str() >= cutoff.as_str(),
            None => true,
        })
        .map(|(date, owners)| DauBucket {
            date,
            active_users: owners.len() as u64,
            total_users,
        })
        .collect()
}
