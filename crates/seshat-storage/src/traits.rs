//! The backend-agnostic storage contract.
//!
//! This module defines the interface session and token logic consumes:
//! `get`/`set`/`delete` keyed by string, with optional TTL expiration.
//!
//! # Implementations
//!
//! - [`MemoryStore`](crate::MemoryStore) - transient in-process map
//! - [`DurableStore`](crate::DurableStore) - persistent relational table
//!   behind an [`ExecuteAdapter`](crate::ExecuteAdapter)
//!
//! The object-safe [`KeyValueStorage`] trait works in terms of
//! [`StoredValue`]; the blanket [`KeyValueStorageExt`] extension adds the
//! typed `get::<T>`/`set::<T>` surface on top of it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageResult;
use crate::value::StoredValue;

// =============================================================================
// Options
// =============================================================================

/// Options for a `set` operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Time-to-live. `None` means the entry never expires.
    pub ttl: Option<Duration>,
}

impl SetOptions {
    /// Options with no expiration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time-to-live.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the time-to-live in whole seconds.
    #[must_use]
    pub fn with_ttl_seconds(self, seconds: u64) -> Self {
        self.with_ttl(Duration::from_secs(seconds))
    }
}

// =============================================================================
// Storage Contract
// =============================================================================

/// Key-value storage with TTL expiration.
///
/// Absence is a normal outcome, not a failure: `get_value` returns
/// `Ok(None)` for missing keys and for entries whose expiration has passed,
/// and callers must not distinguish the two.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Look up the value stored under `key`.
    ///
    /// Entries with `expires_at <= now` read as absent; the boundary is
    /// non-strict, so an entry expiring exactly now is already gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails. A missing or
    /// expired key is `Ok(None)`, never an error.
    async fn get_value(&self, key: &str) -> StorageResult<Option<StoredValue>>;

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// Last write wins: value and expiration are both replaced, with no
    /// merging.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is empty or the storage operation fails.
    async fn set_value(
        &self,
        key: &str,
        value: StoredValue,
        options: SetOptions,
    ) -> StorageResult<()>;

    /// Remove the entry for `key`.
    ///
    /// Deleting a non-existent key is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_value(&self, key: &str) -> StorageResult<()>;

    /// Physically remove expired entries.
    ///
    /// Intended to be invoked periodically by the caller; the store runs no
    /// internal timer.
    ///
    /// # Returns
    ///
    /// The number of expired entries found. With nothing expired this
    /// returns 0 and removes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup(&self) -> StorageResult<u64>;
}

/// Typed convenience surface over [`KeyValueStorage`].
#[async_trait]
pub trait KeyValueStorageExt: KeyValueStorage {
    /// Look up and deserialize the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or the stored value
    /// does not deserialize into `T`.
    async fn get<T>(&self, key: &str) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_value(key).await? {
            Some(value) => Ok(Some(value.into_typed()?)),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`.
    ///
    /// Strings are stored verbatim; other types are serialized to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage operation fails.
    async fn set<T>(&self, key: &str, value: &T, options: SetOptions) -> StorageResult<()>
    where
        T: Serialize + Sync,
    {
        let stored = StoredValue::from_serialize(value)?;
        self.set_value(key, stored, options).await
    }

    /// Remove the entry for `key`. See [`KeyValueStorage::delete_value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.delete_value(key).await
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorageExt for S {}
