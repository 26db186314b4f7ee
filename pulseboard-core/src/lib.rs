//! Pulseboard Core - Feed Activity Types and Aggregation
//!
//! Pure domain logic for the pulseboard dashboard: table-name
//! validation, timestamp-field resolution, timezone normalization,
//! recency windows, daily-activity aggregation, and daily-active-user
//! reduction. No database access and no HTTP - the API crate wires
//! these functions to real data.

pub mod aggregate;
pub mod dau;
pub mod error;
pub mod identity;
pub mod labels;
pub mod normalize;
pub mod summary;
pub mod timefield;
pub mod window;

pub use aggregate::{bucket_daily_activity, bucket_daily_activity_at, DailyBucket, UNKNOWN_ACTION};
pub use dau::{daily_active_users, daily_active_users_at, DauBucket, FetchStatus, UserActivity};
pub use error::CoreError;
pub use identity::{is_valid_feed_table, FeedTable, FEED_TABLE_SUFFIX};
pub use labels::{action_color, action_description};
pub use normalize::{normalize_row, to_display_time, DISPLAY_TZ, NORMALIZED_FIELD, RAW_FIELD};
pub use summary::{sort_summaries, summarize_user, UserSummary};
pub use timefield::{
    parse_instant, pick_timestamp_column, resolve_timestamp, EventInstant,
    TIMESTAMP_FIELD_CANDIDATES,
};
pub use window::RecencyWindow;

/// JSON object type used for raw and normalized rows.
///
/// Rows come from `SELECT *` against tables whose schemas are only
/// discovered at runtime, so they stay as open-ended JSON maps rather
/// than typed structs.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
