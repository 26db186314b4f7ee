//! Daily activity aggregation.
//!
//! Buckets timestamped, labeled events into calendar-day buckets within
//! a recency window. Calendar days are derived in the display timezone
//! (Los Angeles), the same civil calendar the normalized
//! `_createdDate` string uses, so display and bucketing agree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timefield::{parse_instant, resolve_timestamp};
use crate::window::{now_local, RecencyWindow};
use crate::JsonMap;

/// Sentinel label for events without an action field.
pub const UNKNOWN_ACTION: &str = "UNKNOWN";

/// Row field holding the action label.
pub const ACTION_FIELD: &str = "action";

/// One calendar day of activity.
///
/// Invariant: `actions.values().sum() == count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    /// Calendar-day key, canonical `YYYY-MM-DD`.
    pub date: String,
    /// Total events that day.
    pub count: u64,
    /// Per-action-label counts.
    pub actions: BTreeMap<String, u64>,
}

/// Bucket events into daily activity, filtered to the recency window,
/// relative to the current time.
///
/// `date_field` overrides which row field is read first; the candidate
/// fallback chain applies either way. Rows whose timestamp is missing
/// or unparsable are skipped silently.
pub fn bucket_daily_activity(
    rows: &[JsonMap],
    window: RecencyWindow,
    date_field: Option<&str>,
) -> Vec<DailyBucket> {
    bucket_daily_activity_at(rows, window, date_field, now_local())
}

/// [`bucket_daily_activity`] with an explicit "now", for deterministic
/// evaluation.
pub fn bucket_daily_activity_at(
    rows: &[JsonMap],
    window: RecencyWindow,
    date_field: Option<&str>,
    now: chrono::NaiveDateTime,
) -> Vec<DailyBucket> {
    let cutoff = window.cutoff_at(now);
    let mut days: BTreeMap<String, DailyBucket> = BTreeMap::new();

    for row in rows {
        let Some(value) = resolve_timestamp(row, date_field) else {
            continue;
        };
        let Some(instant) = parse_instant(value) else {
            continue;
        };
        let local = instant.local_civil();
        if let Some(cutoff) = cutoff {
            if local < cutoff {
                continue;
            }
        }

        let key = local.date().format("%Y-%m-%d").to_string();
        let bucket = days.entry(key.clone()).or_insert_with(|| DailyBucket {
            date: key,
            count: 0,
            actions: BTreeMap::new(),
        });
        bucket.count += 1;
        *bucket.actions.entry(action_label(row)).or_insert(0) += 1;
    }

    // BTreeMap iteration already yields ascending YYYY-MM-DD keys,
    // which is chronological order for this format.
    days.into_values().collect()
}

fn action_label(row: &JsonMap) -> String {
    match row.get(ACTION_FIELD) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        _ => UNKNOWN_ACTION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn event(date: &str, action: &str) -> JsonMap {
        let mut row = JsonMap::new();
        row.insert("_createdDate".to_string(), json!(format!("{date} 10:00:00")));
        row.insert("action".to_string(), json!(action));
        row
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let buckets = bucket_daily_activity_at(&[], RecencyWindow::All, None, now());
        assert!(buckets.is_empty());
    }

    #[test]
    fn groups_by_day_and_action() {
        let rows = vec![
            event("2024-06-10", "LISTIN"),
            event("2024-06-10", "LISTIN"),
            event("2024-06-10", "CHECKED"),
            event("2024-06-11", "LISTOUT"),
        ];
        let buckets = bucket_daily_activity_at(&rows, RecencyWindow::All, None, now());

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, "2024-06-10");
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[0].actions["LISTIN"], 2);
        assert_eq!(buckets[0].actions["CHECKED"], 1);
        assert_eq!(buckets[1].date, "2024-06-11");
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn week_window_filters_old_events() {
        let rows = vec![event("2024-06-01", "LISTIN"), event("2024-06-10", "LISTIN")];
        let buckets = bucket_daily_activity_at(&rows, RecencyWindow::Week, None, now());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, "2024-06-10");
    }

    #[test]
    fn missing_action_becomes_unknown() {
        let mut row = JsonMap::new();
        row.insert("_createdDate".to_string(), json!("2024-06-10 10:00:00"));
        let buckets = bucket_daily_activity_at(&[row], RecencyWindow::All, None, now());
        assert_eq!(buckets[0].actions[UNKNOWN_ACTION], 1);
    }

    #[test]
    fn empty_string_action_becomes_unknown() {
        let rows = vec![event("2024-06-10", "")];
        let buckets = bucket_daily_activity_at(&rows, RecencyWindow::All, None, now());
        assert_eq!(buckets[0].actions[UNKNOWN_ACTION], 1);
    }

    #[test]
    fn unparsable_timestamp_is_skipped_not_fatal() {
        let mut bad = JsonMap::new();
        bad.insert("_createdDate".to_string(), json!("not-a-date"));
        bad.insert("action".to_string(), json!("LISTIN"));

        let rows = vec![bad, event("2024-06-10", "LISTIN")];
        let buckets = bucket_daily_activity_at(&rows, RecencyWindow::All, None, now());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 1);
    }

    #[test]
    fn rows_without_any_timestamp_are_skipped() {
        let mut row = JsonMap::new();
        row.insert("action".to_string(), json!("LISTIN"));
        let buckets = bucket_daily_activity_at(&[row], RecencyWindow::All, None, now());
        assert!(buckets.is_empty());
    }

    #[test]
    fn custom_date_field_is_read_first() {
        let mut row = JsonMap::new();
        row.insert("event_time".to_string(), json!("2024-06-10 10:00:00"));
        row.insert("action".to_string(), json!("LISTIN"));

        let buckets =
            bucket_daily_activity_at(&[row], RecencyWindow::All, Some("event_time"), now());
        assert_eq!(buckets[0].date, "2024-06-10");
    }

    #[test]
    fn zoned_timestamps_bucket_in_la_calendar() {
        // 2024-06-11 02:00 UTC is still 2024-06-10 in Los Angeles.
        let mut row = JsonMap::new();
        row.insert("created_at".to_string(), json!("2024-06-11T02:00:00Z"));
        row.insert("action".to_string(), json!("LISTIN"));

        let buckets = bucket_daily_activity_at(&[row], RecencyWindow::All, None, now());
        assert_eq!(buckets[0].date, "2024-06-10");
    }

    #[test]
    fn output_is_sorted_ascending() {
        let rows = vec![
            event("2024-06-12", "A"),
            event("2024-06-09", "B"),
            event("2024-06-11", "C"),
        ];
        let buckets = bucket_daily_activity_at(&rows, RecencyWindow::All, None, now());
        let dates: Vec<&str> = buckets.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-09", "2024-06-11", "2024-06-12"]);
    }

    fn arb_event() -> impl Strategy<Value = JsonMap> {
        let day = 1u32..=28;
        let action = prop::sample::select(vec!["LISTIN", "LISTOUT", "CHECKED", ""]);
        (day, action).prop_map(|(day, action)| {
            let mut row = JsonMap::new();
            row.insert(
                "_createdDate".to_string(),
                Value::String(format!("2024-06-{day:02} 10:00:00")),
            );
            row.insert("action".to_string(), Value::String(action.to_string()));
            row
        })
    }

    proptest! {
        #[test]
        fn action_counts_always_sum_to_total(rows in prop::collection::vec(arb_event(), 0..200)) {
            let buckets = bucket_daily_activity_at(&rows, RecencyWindow::All, None, now());
            for bucket in &buckets {
                prop_assert_eq!(bucket.actions.values().sum::<u64>(), bucket.count);
            }
        }

        #[test]
        fn aggregation_is_permutation_invariant(
            rows in prop::collection::vec(arb_event(), 0..100),
            seed in any::<u64>(),
        ) {
            let baseline = bucket_daily_activity_at(&rows, RecencyWindow::All, None, now());

            let mut shuffled = rows.clone();
            // Cheap deterministic shuffle.
            let len = shuffled.len();
            if len > 1 {
                for i in 0..len {
                    let j = (seed as usize).wrapping_mul(31).wrapping_add(i * 17) % len;
                    shuffled.swap(i, j);
                }
            }

            let permuted = bucket_daily_activity_at(&shuffled, RecencyWindow::All, None, now());
            prop_assert_eq!(baseline, permuted);
        }
    }
}
