//! Timestamp-field resolution.
//!
//! Source tables disagree on what their date column is called, so a
//! fixed, ordered candidate list is the contract: both column selection
//! (which column sorts the fetch) and per-row value lookup walk the
//! same list, first match wins.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::normalize::DISPLAY_TZ;
use crate::JsonMap;

/// Candidate timestamp field names, in priority order. The order is a
/// documented contract, not an implementation detail.
pub const TIMESTAMP_FIELD_CANDIDATES: [&str; 5] = [
    "_createdDate",
    "created_at",
    "_createddate",
    "createdDate",
    "createdAt",
];

/// Pick the timestamp column for a table: the first candidate (by
/// candidate priority) with a case-insensitive match in `columns`.
/// Returns the column name as it appears in the table, since it is
/// used verbatim as the ORDER BY key.
pub fn pick_timestamp_column(columns: &[String]) -> Option<String> {
    TIMESTAMP_FIELD_CANDIDATES.iter().find_map(|candidate| {
        columns
            .iter()
            .find(|col| col.eq_ignore_ascii_case(candidate))
            .cloned()
    })
}

/// Resolve the timestamp value for a row: the preferred field first
/// (when given), then the candidate chain. Null values do not count as
/// present.
pub fn resolve_timestamp<'a>(row: &'a JsonMap, preferred: Option<&str>) -> Option<&'a Value> {
    if let Some(field) = preferred {
        if let Some(value) = row.get(field).filter(|v| !v.is_null()) {
            return Some(value);
        }
    }
    TIMESTAMP_FIELD_CANDIDATES
        .iter()
        .find_map(|field| row.get(*field).filter(|v| !v.is_null()))
}

/// A parsed event timestamp.
///
/// Inputs either carry an explicit UTC offset (RFC 3339, epoch values)
/// or are naive wall-clock strings whose zone is only known from
/// context. The two cases are kept apart so callers can decide how to
/// anchor naive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventInstant {
    /// Timestamp with an explicit offset.
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock timestamp without zone information.
    Naive(NaiveDateTime),
}

impl EventInstant {
    /// The instant in UTC. Naive values are anchored to UTC, matching
    /// how the source database stores its timestamps.
    pub fn to_utc(self) -> DateTime<Utc> {
        match self {
            EventInstant::Zoned(dt) => dt.with_timezone(&Utc),
            EventInstant::Naive(naive) => Utc.from_utc_datetime(&naive),
        }
    }

    /// Civil wall-clock time used for calendar-day bucketing. Zoned
    /// values are converted to the display timezone; naive values are
    /// taken at face value (the normalized `_createdDate` string is
    /// already display-zone wall clock).
    pub fn local_civil(self) -> NaiveDateTime {
        match self {
            EventInstant::Zoned(dt) => dt.with_timezone(&DISPLAY_TZ).naive_local(),
            EventInstant::Naive(naive) => naive,
        }
    }
}

/// Parse a JSON value into an [`EventInstant`].
///
/// Accepted shapes: RFC 3339 strings, `YYYY-MM-DD HH:MM:SS[.frac]` and
/// `YYYY-MM-DDTHH:MM:SS[.frac]` naive strings, bare `YYYY-MM-DD`
/// dates, and integer epoch seconds or milliseconds. Anything else
/// yields `None` - a malformed timestamp must never fail a whole
/// aggregation pass.
pub fn parse_instant(value: &Value) -> Option<EventInstant> {
    match value {
        Value::String(s) => parse_instant_str(s),
        Value::Number(n) => {
            let epoch = n.as_i64()?;
            // Millisecond epochs are 13+ digits for any modern date.
            let dt = if epoch.unsigned_abs() >= 100_000_000_000 {
                DateTime::<Utc>::from_timestamp_millis(epoch)?
            } else {
                DateTime::<Utc>::from_timestamp(epoch, 0)?
            };
            Some(EventInstant::Zoned(dt.fixed_offset()))
        }
        _ => None,
    }
}

fn parse_instant_str(s: &str) -> Option<EventInstant> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(EventInstant::Zoned(dt));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(EventInstant::Naive(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(EventInstant::Naive(date.and_hms_opt(0, 0, 0)?));
    }
    None
}
