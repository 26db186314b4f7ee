//! Database connection pool and feed-table access.
//!
//! PostgreSQL connection pooling via deadpool-postgres, plus the three
//! read operations this service performs: suffix-filtered table
//! discovery, column introspection, and a bounded `SELECT *` fetch.
//! Table and column names are interpolated as quoted structural
//! identifiers, never as literal values - the allow-list upstream
//! already rejected hostile names, and the quoting holds even if it
//! had not.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use pulseboard_core::{FeedTable, JsonMap};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Row cap for a single table fetch.
pub const MAX_ROWS: i64 = 1000;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "pulseboard".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a database configuration from environment variables
    /// (`PULSEBOARD_DB_HOST`, `PULSEBOARD_DB_PORT`, `PULSEBOARD_DB_NAME`,
    /// `PULSEBOARD_DB_USER`, `PULSEBOARD_DB_PASSWORD`,
    /// `PULSEBOARD_DB_POOL_SIZE`, `PULSEBOARD_DB_TIMEOUT`).
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PULSEBOARD_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("PULSEBOARD_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("PULSEBOARD_DB_NAME")
                .unwrap_or_else(|_| "pulseboard".to_string()),
            user: std::env::var("PULSEBOARD_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("PULSEBOARD_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("PULSEBOARD_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("PULSEBOARD_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// A missing password is a fatal startup condition, not a
    /// retryable one.
    pub fn ensure_password(&self) -> ApiResult<()> {
        if self.password.is_empty() {
            return Err(ApiError::internal_error(
                "PULSEBOARD_DB_PASSWORD environment variable is required",
            ));
        }
        Ok(())
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// IDENTIFIER QUOTING
// ============================================================================

/// Quote a string as a structural SQL identifier: double-quote
/// wrapping with embedded double quotes doubled.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client wrapping a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Round-trip connectivity check.
    pub async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    // ========================================================================
    // FEED TABLE OPERATIONS
    // ========================================================================

    /// Discover all tables in the active schema whose name ends with
    /// `_new_feed`, sorted ascending.
    ///
    /// Uses `right(table_name, 9)` rather than `LIKE`: the underscore
    /// in the suffix is a `LIKE` wildcard and would over-match.
    pub async fn list_feed_tables(&self) -> ApiResult<Vec<String>> {
        let conn = self.get_conn().await?;

        let rows = conn
            .query(
                "SELECT table_name::text \
                 FROM information_schema.tables \
                 WHERE table_schema = current_schema() \
                 AND right(table_name, 9) = '_new_feed' \
                 ORDER BY table_name",
                &[],
            )
            .await?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// Ordered column names for a validated table. An empty list means
    /// the table does not exist; callers map that to not-found.
    pub async fn table_columns(&self, table: &FeedTable) -> ApiResult<Vec<String>> {
        let conn = self.get_conn().await?;

        let rows = conn
            .query(
                "SELECT column_name::text \
                 FROM information_schema.columns \
                 WHERE table_schema = current_schema() \
                 AND table_name = $1 \
                 ORDER BY ordinal_position",
                &[&table.as_str()],
            )
            .await?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// Fetch up to [`MAX_ROWS`] rows, newest first when a timestamp
    /// column was resolved, unordered otherwise. Zero rows is a valid
    /// empty result.
    pub async fn fetch_recent_rows(
        &self,
        table: &FeedTable,
        date_column: Option<&str>,
    ) -> ApiResult<Vec<JsonMap>> {
        let conn = self.get_conn().await?;

        let query = match date_column {
            Some(column) => format!(
                "SELECT * FROM {} ORDER BY {} DESC LIMIT {}",
                quote_identifier(table.as_str()),
                quote_identifier(column),
                MAX_ROWS,
            ),
            None => format!(
                "SELECT * FROM {} LIMIT {}",
                quote_identifier(table.as_str()),
                MAX_ROWS,
            ),
        };

        tracing::debug!(table = %table, date_column = ?date_column, "fetching rows");
        let rows = conn.query(&query, &[]).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

// ============================================================================
// DYNAMIC ROW MATERIALIZATION
// ============================================================================

/// Materialize a `SELECT *` row into a JSON object. Schemas are only
/// known at runtime, so each cell is converted by its reported
/// Postgres type; unsupported types come through as null.
pub fn row_to_json(row: &Row) -> JsonMap {
    let mut map = JsonMap::new();
    for (idx, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), cell_to_json(row, idx));
    }
    map
}

fn cell_to_json(row: &Row, idx: usize) -> JsonValue {
    let ty = row.columns()[idx].type_();
    match ty.name() {
        "bool" => opt_value(row.try_get::<_, Option<bool>>(idx)),
        "int2" => opt_value(row.try_get::<_, Option<i16>>(idx)),
        "int4" => opt_value(row.try_get::<_, Option<i32>>(idx)),
        "int8" => opt_value(row.try_get::<_, Option<i64>>(idx)),
        "float4" => opt_value(row.try_get::<_, Option<f32>>(idx)),
        "float8" => opt_value(row.try_get::<_, Option<f64>>(idx)),
        "text" | "varchar" | "bpchar" | "name" => {
            opt_value(row.try_get::<_, Option<String>>(idx))
        }
        // Naive timestamps keep their wall-clock form; zoned ones are
        // rendered RFC 3339 so downstream parsing sees the offset.
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map_or(JsonValue::Null, |dt| {
                JsonValue::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .ok()
            .flatten()
            .map_or(JsonValue::Null, |dt| JsonValue::String(dt.to_rfc3339())),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .ok()
            .flatten()
            .map_or(JsonValue::Null, |d| {
                JsonValue::String(d.format("%Y-%m-%d").to_string())
            }),
        "uuid" => row
            .try_get::<_, Option<Uuid>>(idx)
            .ok()
            .flatten()
            .map_or(JsonValue::Null, |u| JsonValue::String(u.to_string())),
        "json" | "jsonb" => row
            .try_get::<_, Option<JsonValue>>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null),
        other => {
            tracing::debug!(column_type = other, "unsupported column type, emitting null");
            JsonValue::Null
        }
    }
}

fn opt_value<T: Into<JsonValue>>(cell: Result<Option<T>, tokio_postgres::Error>) -> JsonValue {
    cell.ok()
        .flatten()
        .map_or(JsonValue::Null, |v| v.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn quote_identifier_wraps_and_doubles_quotes() {
        assert_eq!(quote_identifier("alice_new_feed"), "\"alice_new_feed\"");
        assert_eq!(quote_identifier("created_at"), "\"created_at\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn default_config_has_no_password() {
        let config = DbConfig::default();
        assert!(config.password.is_empty());
        assert!(config.ensure_password().is_err());
    }

    #[test]
    fn password_check_passes_when_set() {
        let config = DbConfig {
            password: "secret".to_string(),
            ..DbConfig::default()
        };
        assert!(config.ensure_password().is_ok());
    }

    #[test]
    fn fetch_query_shape() {
        // The query text is assembled the same way fetch_recent_rows
        // does; ordered and unordered shapes must both be valid.
        let table = FeedTable::parse("alice_new_feed").unwrap();
        let ordered = format!(
            "SELECT * FROM {} ORDER BY {} DESC LIMIT {}",
            quote_identifier(table.as_str()),
            quote_identifier("created_at"),
            MAX_ROWS,
        );
        assert_eq!(
            ordered,
            "SELECT * FROM \"alice_new_feed\" ORDER BY \"created_at\" DESC LIMIT 1000"
        );

        let unordered = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(table.as_str()),
            MAX_ROWS,
        );
        assert_eq!(unordered, "SELECT * FROM \"alice_new_feed\" LIMIT 1000");
    }

    proptest! {
        #[test]
        fn quoted_identifier_round_trips(ident in "[ -~]{0,40}") {
            let quoted = quote_identifier(&ident);
            prop_assert!(quoted.starts_with('"'));
            prop_assert!(quoted.ends_with('"'));

            // Undoing the quoting recovers the input exactly, so no
            // identifier can smuggle structure past the wrapping.
            let inner = &quoted[1..quoted.len() - 1];
            prop_assert_eq!(inner.replace("\"\"", "\""), ident);
        }
    }
}
