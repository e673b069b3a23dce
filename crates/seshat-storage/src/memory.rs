//! The transient in-process backend.
//!
//! A timestamp-guarded map with the same logical-expiration semantics as the
//! durable store: expired entries read as absent immediately and are removed
//! physically only by `cleanup` or an explicit delete. Suitable for tests
//! and single-process deployments where persistence is not needed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::traits::{KeyValueStorage, SetOptions};
use crate::value::StoredValue;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: StoredValue,
    expires_at: Option<i64>,
}

impl MemoryEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// In-process key-value store with TTL expiration.
///
/// No background timer runs; callers invoke
/// [`cleanup`](KeyValueStorage::cleanup) periodically if they care about
/// reclaiming memory from expired entries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically present entries, expired ones included.
    ///
    /// Test and diagnostics helper; live code should go through `get`.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if no entries are physically present.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStore {
    async fn get_value(&self, key: &str) -> StorageResult<Option<StoredValue>> {
        validate_key(key)?;
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if entry.is_expired(now_ms()) {
            return Ok(None);
        }
        Ok(Some(entry.value.clone()))
    }

    async fn set_value(
        &self,
        key: &str,
        value: StoredValue,
        options: SetOptions,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let expires_at = options.ttl.map(|ttl: Duration| {
            now_ms().saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
        });
        self.entries
            .write()
            .await
            .insert(key.to_owned(), MemoryEntry { value, expires_at });
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn cleanup(&self) -> StorageResult<u64> {
        let now = now_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok((before - entries.len()) as u64)
    }
}

fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_input("key must not be empty"));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
