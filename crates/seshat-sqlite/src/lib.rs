//! SQLite execution adapter for `seshat-storage`.
//!
//! Translates the uniform statement-plus-parameters contract of
//! [`ExecuteAdapter`] into sqlx SQLite calls. SQLite already uses positional
//! `?` placeholders, so statements pass through untranslated; result cells
//! are extracted by column index in select order, exactly as the contract
//! requires.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use seshat_sqlite::SqliteAdapter;
//! use seshat_storage::{DurableStore, ExecuteAdapter};
//!
//! let adapter = Arc::new(SqliteAdapter::connect("sqlite://sessions.db").await?);
//! let store = DurableStore::with_defaults(adapter)?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::pool::{Pool, PoolOptions};
use sqlx_core::query::query;
use sqlx_core::row::Row as _;
use sqlx_sqlite::{Sqlite, SqliteRow};
use tracing::debug;

use seshat_storage::{AdapterError, ExecuteAdapter, Row, SqlValue};

/// SQLite connection pool type alias.
pub type SqlitePool = Pool<Sqlite>;

// =============================================================================
// Adapter
// =============================================================================

/// Execution adapter over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    pool: Arc<SqlitePool>,
}

impl SqliteAdapter {
    /// Create an adapter over an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Create an adapter by connecting to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, AdapterError> {
        let pool = PoolOptions::<Sqlite>::new()
            .connect(url)
            .await
            .map_err(AdapterError::new)?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create an adapter over a fresh in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires: each
    /// SQLite `:memory:` connection is a distinct database, so a wider or
    /// recycling pool would scatter statements across unrelated databases.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn in_memory() -> Result<Self, AdapterError> {
        let pool = PoolOptions::<Sqlite>::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(AdapterError::new)?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ExecuteAdapter for SqliteAdapter {
    async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, AdapterError> {
        debug!(statement, params = params.len(), "executing statement");

        let mut query = query(statement);
        for param in params {
            query = match param {
                SqlValue::Null => query.bind(Option::<String>::None),
                SqlValue::Text(text) => query.bind(text.clone()),
                SqlValue::Integer(value) => query.bind(*value),
            };
        }

        let rows = query
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(AdapterError::new)?;

        rows.iter().map(extract_cells).collect()
    }
}

/// Extract one result row as cells in select-column order.
///
/// SQLite is dynamically typed, so each cell is probed as an integer first
/// (aggregates like `COUNT(*)` come back as INTEGER) and as text otherwise.
fn extract_cells(row: &SqliteRow) -> Result<Row, AdapterError> {
    let mut cells = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
            cells.push(match value {
                Some(value) => SqlValue::Integer(value),
                None => SqlValue::Null,
            });
            continue;
        }
        let value: Option<String> = row.try_get(index).map_err(AdapterError::new)?;
        cells.push(SqlValue::from_optional_text(value));
    }
    Ok(cells)
}

// =============================================================================
// Tests
// =============================================================================
