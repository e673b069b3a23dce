//! Execution adapter boundary contract.
//!
//! This module defines the narrow interface between the durable store and
//! whatever driver actually talks to the backing database: execute one
//! parameterized statement, return the result rows as ordered value tuples.
//!
//! The store never inspects column names - only positional order - so
//! adapters must return cells in exactly the order columns were selected.
//! Drivers with object-shaped row results must extract cells in statement
//! column order before returning them.
//!
//! # Implementation Notes
//!
//! Statements use positional `?` placeholders. Adapters for drivers with a
//! different placeholder convention (e.g. `$1`) are responsible for the
//! translation. The store only ever issues five statement shapes:
//! create-table-if-absent, create-index-if-absent, upsert-by-key,
//! select-by-key/filter, and delete-by-key/filter.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;

// =============================================================================
// Values
// =============================================================================

/// A single cell crossing the adapter boundary, as parameter or result.
///
/// The persisted schema is all-text, so parameters are `Text` or `Null`;
/// `Integer` exists so aggregate results (`COUNT(*)`) and epoch-millisecond
/// comparisons cross the boundary without string contortions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// A text value.
    Text(String),
    /// A 64-bit integer value.
    Integer(i64),
}

impl SqlValue {
    /// Wrap an optional string, mapping `None` to `Null`.
    #[must_use]
    pub fn from_optional_text(text: Option<String>) -> Self {
        match text {
            Some(text) => Self::Text(text),
            None => Self::Null,
        }
    }

    /// Returns `true` if this cell is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the cell as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Read the cell as an integer.
    ///
    /// Text cells holding a decimal integer parse through, so adapters for
    /// drivers that return aggregates as text still satisfy the contract.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Consume the cell into an optional string (`Null` becomes `None`).
    #[must_use]
    pub fn into_optional_text(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(text) => Some(text),
            Self::Integer(value) => Some(value.to_string()),
        }
    }
}

/// One result row: cells in select-column order.
pub type Row = Vec<SqlValue>;

// =============================================================================
// Errors
// =============================================================================

/// An opaque failure surfaced by an execution adapter.
///
/// The store propagates these unchanged inside
/// [`StorageError::Adapter`](crate::StorageError::Adapter); it never
/// inspects, retries, or translates them.
#[derive(Debug)]
pub struct AdapterError(Box<dyn StdError + Send + Sync>);

impl AdapterError {
    /// Wrap a driver error.
    #[must_use]
    pub fn new(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(error.into())
    }

    /// Create an error from a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }

    /// Consume the wrapper, returning the underlying driver error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl StdError for AdapterError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<Box<dyn StdError + Send + Sync>> for AdapterError {
    fn from(error: Box<dyn StdError + Send + Sync>) -> Self {
        Self(error)
    }
}

// =============================================================================
// Contract
// =============================================================================

/// The execution adapter contract.
///
/// Implementations translate one parameterized statement into their driver's
/// native calling convention and return result rows as ordered tuples.
/// Statements that produce no result set (DDL, DML) return an empty vec.
///
/// # Example Implementation
///
/// ```ignore
/// use seshat_storage::{AdapterError, ExecuteAdapter, Row, SqlValue};
///
/// struct MyDriverAdapter {
///     conn: my_driver::Connection,
/// }
///
/// #[async_trait::async_trait]
/// impl ExecuteAdapter for MyDriverAdapter {
///     async fn execute(
///         &self,
///         statement: &str,
///         params: &[SqlValue],
///     ) -> Result<Vec<Row>, AdapterError> {
///         let rows = self.conn.query(statement, params).await.map_err(AdapterError::new)?;
///         Ok(rows.into_iter().map(to_ordered_cells).collect())
///     }
/// }
/// ```
#[async_trait]
pub trait ExecuteAdapter: Send + Sync {
    /// Execute one statement with positional parameters.
    ///
    /// # Errors
    ///
    /// Returns the driver's failure wrapped in [`AdapterError`].
    async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Row>, AdapterError>;
}

// =============================================================================
// Tests
// =============================================================================
