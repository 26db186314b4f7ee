//! Core error types.

use thiserror::Error;

/// Errors produced by the core domain layer.
///
/// Aggregation and reduction are infallible by contract: a malformed
/// row is skipped, never escalated. The only fallible core operation
/// is parsing an untrusted table name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Candidate table name failed the feed-table allow-list.
    #[error("invalid table name {name:?}: must match [A-Za-z0-9_-]+ and end with \"_new_feed\"")]
    InvalidTableName { name: String },
}
