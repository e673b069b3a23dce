//! Storage error types.
//!
//! This module defines the errors that storage operations can surface.
//! A missing or expired key is not an error: `get` reports absence as
//! `Ok(None)`, and callers must treat that as the sole not-found signal.

use crate::adapter::AdapterError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The execution adapter reported a failure.
    ///
    /// Adapter failures (connection loss, malformed statement, constraint
    /// violation) pass through unchanged; the store performs no retry.
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Serialization or deserialization of a typed value failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input data (empty key, malformed table identifier).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The adapter returned a row that violates the statement's shape
    /// (wrong arity, NULL in a NOT NULL column, unparseable timestamp).
    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

impl StorageError {
    // -------------------------------------------------------------------------
    // Constructor Methods
    // -------------------------------------------------------------------------

    /// Create an `Adapter` error from any driver error.
    #[must_use]
    pub fn adapter(error: impl Into<AdapterError>) -> Self {
        Self::Adapter(error.into())
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a `MalformedRow` error.
    #[must_use]
    pub fn malformed_row(message: impl Into<String>) -> Self {
        Self::MalformedRow(message.into())
    }

    // -------------------------------------------------------------------------
    // Predicate Methods
    // -------------------------------------------------------------------------

    /// Returns `true` if this is an adapter error.
    #[must_use]
    pub fn is_adapter_error(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }

    /// Returns `true` if this is a serialization error.
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Returns `true` if this is an invalid input error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` if this is a malformed row error.
    #[must_use]
    pub fn is_malformed_row(&self) -> bool {
        matches!(self, Self::MalformedRow(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Tests
// =============================================================================
