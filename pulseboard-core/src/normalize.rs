//! Timestamp normalization to the display timezone.
//!
//! Every fetched row gets its timestamp rewritten to Los Angeles civil
//! time under a fixed field name, with the original value preserved.
//! The conversion uses IANA tzdata rules, so wall-clock output is
//! correct across daylight-saving transitions, not just offset by a
//! constant.

use chrono_tz::Tz;
use serde_json::Value;

use crate::timefield::{parse_instant, TIMESTAMP_FIELD_CANDIDATES};
use crate::JsonMap;

/// Canonical display timezone. Fixed by contract, not configurable.
pub const DISPLAY_TZ: Tz = chrono_tz::America::Los_Angeles;

/// Field holding the normalized display-zone timestamp.
pub const NORMALIZED_FIELD: &str = "_createdDate";

/// Field holding the original, unconverted timestamp value.
pub const RAW_FIELD: &str = "_createdDateUTC";

/// Prefix for the extra copy kept when the source field name differs
/// from [`NORMALIZED_FIELD`].
pub const ORIGINAL_FIELD_PREFIX: &str = "_original_";

/// Display-zone wall-clock string (`YYYY-MM-DD HH:MM:SS`) for a raw
/// timestamp value, or `None` when the value does not parse.
pub fn to_display_time(value: &Value) -> Option<String> {
    let instant = parse_instant(value)?;
    Some(
        instant
            .to_utc()
            .with_timezone(&DISPLAY_TZ)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

/// Normalize one row.
///
/// The timestamp value is located via the resolved `date_column` first,
/// then the candidate chain. On success three fields are written:
/// `_createdDate` (display-zone string), `_createdDateUTC` (original
/// value), and `_original_<field>` when the source field was not
/// already `_createdDate`. When no timestamp resolves, the row passes
/// through unchanged - the derived fields are omitted, not nulled.
/// Other fields are never touched.
pub fn normalize_row(mut row: JsonMap, date_column: Option<&str>) -> JsonMap {
    let source_field = find_timestamp_field(&row, date_column);

    if let Some(field) = source_field {
        let raw = row.get(&field).cloned().unwrap_or(Value::Null);
        if let Some(display) = to_display_time(&raw) {
            row.insert(NORMALIZED_FIELD.to_string(), Value::String(display));
            row.insert(RAW_FIELD.to_string(), raw.clone());
            if field != NORMALIZED_FIELD {
                row.insert(format!("{ORIGINAL_FIELD_PREFIX}{field}"), raw);
            }
        }
    }

    row
}

/// Name of the field the timestamp will be read from, mirroring
/// [`resolve_timestamp`] but returning the key instead of the value.
fn find_timestamp_field(row: &JsonMap, date_column: Option<&str>) -> Option<String> {
    if let Some(col) = date_column {
        if row.get(col).filter(|v| !v.is_null()).is_some() {
            return Some(col.to_string());
        }
    }
    TIMESTAMP_FIELD_CANDIDATES
        .iter()
        .find(|field| row.get(**field).filter(|v| !v.is_null()).is_some())
        .map(|field| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> JsonMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn converts_utc_to_la_in_winter() {
        // PST is UTC-8.
        let out = to_display_time(&json!("2024-01-16T02:00:00Z")).unwrap();
        assert_eq!(out, "2024-01-15 18:00:00");
    }

    #[test]
    fn converts_utc_to_la_in_summer() {
        // PDT is UTC-7.
        let out = to_display_time(&json!("2024-07-16T02:00:00Z")).unwrap();
        assert_eq!(out, "2024-07-15 19:00:00");
    }

    #[test]
    fn naive_input_is_treated_as_utc() {
        let out = to_display_time(&json!("2024-01-16 02:00:00")).unwrap();
        assert_eq!(out, "2024-01-15 18:00:00");
    }

    #[test]
    fn dst_spring_forward_boundary() {
        // LA jumps 02:00 -> 03:00 on 2024-03-10. 09:59Z is still PST,
        // 10:01Z is already PDT.
        assert_eq!(
            to_display_time(&json!("2024-03-10T09:59:00Z")).unwrap(),
            "2024-03-10 01:59:00"
        );
        assert_eq!(
            to_display_time(&json!("2024-03-10T10:01:00Z")).unwrap(),
            "2024-03-10 03:01:00"
        );
    }

    #[test]
    fn normalizes_from_resolved_column() {
        let input = row(&[
            ("id", json!(1)),
            ("created_at", json!("2024-01-16 02:00:00")),
            ("action", json!("LISTIN")),
        ]);
        let out = normalize_row(input, Some("created_at"));

        assert_eq!(out.get(NORMALIZED_FIELD), Some(&json!("2024-01-15 18:00:00")));
        assert_eq!(out.get(RAW_FIELD), Some(&json!("2024-01-16 02:00:00")));
        assert_eq!(
            out.get("_original_created_at"),
            Some(&json!("2024-01-16 02:00:00"))
        );
        // Untouched fields survive.
        assert_eq!(out.get("id"), Some(&json!(1)));
        assert_eq!(out.get("action"), Some(&json!("LISTIN")));
    }

    #[test]
    fn no_original_copy_when_source_is_canonical() {
        let input = row(&[("_createdDate", json!("2024-01-16 02:00:00"))]);
        let out = normalize_row(input, Some("_createdDate"));

        assert!(out.contains_key(NORMALIZED_FIELD));
        assert!(out.contains_key(RAW_FIELD));
        assert!(!out.keys().any(|k| k.starts_with(ORIGINAL_FIELD_PREFIX)));
    }

    #[test]
    fn falls_back_to_candidate_chain_when_column_is_empty() {
        let input = row(&[
            ("created_at", Value::Null),
            ("createdAt", json!("2024-01-16 02:00:00")),
        ]);
        let out = normalize_row(input, Some("created_at"));
        assert_eq!(out.get(NORMALIZED_FIELD), Some(&json!("2024-01-15 18:00:00")));
        assert!(out.contains_key("_original_createdAt"));
    }

    #[test]
    fn row_without_timestamp_passes_through_unchanged() {
        let input = row(&[("id", json!(9)), ("action", json!("CHECKED"))]);
        let out = normalize_row(input.clone(), None);
        assert_eq!(out, input);
    }

    #[test]
    fn unparsable_timestamp_omits_derived_fields() {
        let input = row(&[("created_at", json!("not-a-date"))]);
        let out = normalize_row(input.clone(), Some("created_at"));
        assert_eq!(out, input);
    }
}
