//! Feed-table identity: allow-list validation and owner derivation.
//!
//! Table names reach this system from the URL path, so the allow-list
//! runs before a name is used in any dynamically constructed query.
//! The grammar admits UUID-style names such as
//! `247942d3-73d6-44c4-9311-ccffe1acc5bf_new_feed`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::CoreError;

/// Literal suffix every per-user feed table carries.
pub const FEED_TABLE_SUFFIX: &str = "_new_feed";

static FEED_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+_new_feed$").expect("feed table regex"));

/// True iff `name` consists only of ASCII letters, digits, underscore,
/// and hyphen, and ends with `_new_feed`.
pub fn is_valid_feed_table(name: &str) -> bool {
    FEED_TABLE_RE.is_match(name)
}

/// A validated feed-table name.
///
/// Construction goes through [`FeedTable::parse`]; everything
/// downstream (introspection, row fetch) treats the value as an opaque
/// pre-validated token and never re-checks it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedTable(String);

impl FeedTable {
    /// Validate a candidate table name.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        if is_valid_feed_table(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(CoreError::InvalidTableName {
                name: name.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner identity: the table name with the `_new_feed` suffix
    /// stripped.
    pub fn owner_id(&self) -> &str {
        self.0.strip_suffix(FEED_TABLE_SUFFIX).unwrap_or(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FeedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FeedTable {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
