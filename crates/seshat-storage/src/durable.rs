//! The durable TTL store engine.
//!
//! Persists entries in a single relational table driven entirely through an
//! [`ExecuteAdapter`], so the engine runs unmodified against any backing
//! driver that honors the adapter contract.
//!
//! # Table structure
//!
//! One table (default name `oauth_storage`):
//!
//! | column     | type | nullability           |
//! |------------|------|-----------------------|
//! | key        | TEXT | primary key, not null |
//! | value      | TEXT | not null              |
//! | expires_at | TEXT | nullable (epoch ms)   |
//! | created_at | TEXT | not null (epoch ms)   |
//! | updated_at | TEXT | not null (epoch ms)   |
//!
//! plus a secondary index on `expires_at` so cleanup scans stay cheap.
//! `created_at` and `updated_at` exist for observability only; no operation
//! reads them back.
//!
//! # Lifecycle
//!
//! Schema creation is lazy and happens-once: the first operation on a store
//! instance issues the two idempotent DDL statements, gated by a shared
//! initialization future so concurrent first use cannot race duplicate
//! creation. Expired entries are logically absent immediately and removed
//! physically only by cleanup or an explicit delete.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::adapter::{ExecuteAdapter, Row, SqlValue};
use crate::error::{StorageError, StorageResult};
use crate::observer::{NoopObserver, StoreObserver};
use crate::traits::{KeyValueStorage, SetOptions};
use crate::value::StoredValue;

/// Default name of the persisted table.
pub const DEFAULT_TABLE: &str = "oauth_storage";

// =============================================================================
// Options
// =============================================================================

/// Construction-time options for a [`DurableStore`].
#[derive(Clone)]
pub struct DurableStoreOptions {
    table: String,
    observer: Arc<dyn StoreObserver>,
}

impl DurableStoreOptions {
    /// Options with the default table name and a no-op observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the table name.
    ///
    /// The name must be a bare SQL identifier; it is validated when the
    /// store is constructed.
    #[must_use]
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Install a diagnostic observer.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observer = observer;
        self
    }
}

impl Default for DurableStoreOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl fmt::Debug for DurableStoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurableStoreOptions")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Durable Store
// =============================================================================

/// TTL-aware key-value store backed by a relational table.
///
/// The store owns its table exclusively; the backing connection belongs to
/// the caller, who supplies the adapter and manages its lifecycle. Every
/// operation is a single round-trip through the adapter (plus two for the
/// one-time schema initialization). No internal locking, batching, or
/// retrying: same-key racing `set`s resolve to whichever upsert the backing
/// engine commits last, and adapter failures surface unchanged.
///
/// Operations are exposed through [`KeyValueStorage`] (and the typed
/// [`KeyValueStorageExt`](crate::KeyValueStorageExt) surface on top of it).
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use seshat_storage::{DurableStore, DurableStoreOptions, KeyValueStorageExt, SetOptions};
///
/// let store = DurableStore::new(adapter, DurableStoreOptions::new())?;
/// store.set("session:1", &session, SetOptions::new().with_ttl_seconds(600)).await?;
/// ```
pub struct DurableStore {
    adapter: Arc<dyn ExecuteAdapter>,
    table: String,
    observer: Arc<dyn StoreObserver>,
    init: OnceCell<()>,
}

impl DurableStore {
    /// Create a store over `adapter` with the given options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if the configured table name is
    /// not a bare SQL identifier.
    pub fn new(
        adapter: Arc<dyn ExecuteAdapter>,
        options: DurableStoreOptions,
    ) -> StorageResult<Self> {
        validate_table_name(&options.table)?;
        Ok(Self {
            adapter,
            table: options.table,
            observer: options.observer,
            init: OnceCell::new(),
        })
    }

    /// Create a store with default options.
    ///
    /// # Errors
    ///
    /// Never fails with default options; kept fallible for signature
    /// symmetry with [`DurableStore::new`].
    pub fn with_defaults(adapter: Arc<dyn ExecuteAdapter>) -> StorageResult<Self> {
        Self::new(adapter, DurableStoreOptions::new())
    }

    /// The table this store persists into.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run one statement through the adapter.
    ///
    /// Failures are reported to the observer before propagating; the error
    /// itself passes through untranslated.
    async fn execute(&self, statement: &str, params: &[SqlValue]) -> StorageResult<Vec<Row>> {
        match self.adapter.execute(statement, params).await {
            Ok(rows) => Ok(rows),
            Err(error) => {
                self.observer.error(&format!("adapter failure: {error}"));
                Err(StorageError::Adapter(error))
            }
        }
    }

    /// Run the one-time schema initialization if it has not happened yet.
    ///
    /// All callers await the same in-flight initialization, so the DDL runs
    /// exactly once per store instance even under concurrent first use.
    /// Both statements are idempotent; re-running them on a fresh instance
    /// over an existing table is harmless.
    async fn ensure_initialized(&self) -> StorageResult<()> {
        self.init
            .get_or_try_init(|| async {
                self.observer
                    .info(&format!("initializing table {}", self.table));
                let create_table = format!(
                    "CREATE TABLE IF NOT EXISTS {table} (\
                     key TEXT PRIMARY KEY, \
                     value TEXT NOT NULL, \
                     expires_at TEXT, \
                     created_at TEXT NOT NULL, \
                     updated_at TEXT NOT NULL)",
                    table = self.table
                );
                self.execute(&create_table, &[]).await?;

                let create_index = format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_expires_at ON {table} (expires_at)",
                    table = self.table
                );
                self.execute(&create_index, &[]).await?;

                debug!(table = %self.table, "storage schema ready");
                Ok::<(), StorageError>(())
            })
            .await?;
        Ok(())
    }
}

impl fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurableStore")
            .field("table", &self.table)
            .field("initialized", &self.init.initialized())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStorage for DurableStore {
    /// Select by key, then apply the expiration guard engine-side.
    ///
    /// An entry whose `expires_at` is at or before now reads as absent; no
    /// physical deletion happens on the read path. The stored text is
    /// resolved through [`StoredValue::decode`], so unparseable text comes
    /// back raw rather than failing.
    async fn get_value(&self, key: &str) -> StorageResult<Option<StoredValue>> {
        validate_key(key)?;
        self.ensure_initialized().await?;

        let statement = format!("SELECT value, expires_at FROM {} WHERE key = ?", self.table);
        let rows = self.execute(&statement, &[SqlValue::Text(key.to_owned())]).await?;

        let Some(row) = rows.into_iter().next() else {
            self.observer.debug(&format!("get {key}: not found"));
            return Ok(None);
        };
        if row.len() != 2 {
            return Err(StorageError::malformed_row(format!(
                "get expected 2 columns, got {}",
                row.len()
            )));
        }
        let mut cells = row.into_iter();
        let value_cell = cells.next().unwrap_or(SqlValue::Null);
        let expires_cell = cells.next().unwrap_or(SqlValue::Null);

        if let Some(expires_at) = parse_expiry(&expires_cell)?
            && expires_at <= now_ms()
        {
            self.observer.debug(&format!("get {key}: expired"));
            debug!(key, expires_at, "entry logically expired");
            return Ok(None);
        }

        let text = value_cell
            .into_optional_text()
            .ok_or_else(|| StorageError::malformed_row("value column was NULL".to_string()))?;
        self.observer.debug(&format!("get {key}: hit"));
        Ok(Some(StoredValue::decode(&text)))
    }

    /// Single upsert: a new key inserts a fresh row; an existing key has
    /// `value`, `expires_at`, and `updated_at` replaced while `created_at`
    /// stays untouched.
    async fn set_value(
        &self,
        key: &str,
        value: StoredValue,
        options: SetOptions,
    ) -> StorageResult<()> {
        validate_key(key)?;
        self.ensure_initialized().await?;

        let now = now_ms();
        let expires_at = options
            .ttl
            .map(|ttl| now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)));

        let statement = format!(
            "INSERT INTO {table} (key, value, expires_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET \
             value = excluded.value, \
             expires_at = excluded.expires_at, \
             updated_at = excluded.updated_at",
            table = self.table
        );
        let params = [
            SqlValue::Text(key.to_owned()),
            SqlValue::Text(value.encode()),
            SqlValue::from_optional_text(expires_at.map(|ms| ms.to_string())),
            SqlValue::Text(now.to_string()),
            SqlValue::Text(now.to_string()),
        ];
        self.execute(&statement, &params).await?;

        self.observer.debug(&format!("set {key}"));
        debug!(key, expires_at, "entry stored");
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.ensure_initialized().await?;

        let statement = format!("DELETE FROM {} WHERE key = ?", self.table);
        self.execute(&statement, &[SqlValue::Text(key.to_owned())]).await?;

        self.observer.debug(&format!("delete {key}"));
        Ok(())
    }

    /// Count expired rows, then delete them with the same cutoff timestamp.
    ///
    /// Two separate statements, no transaction: under concurrent writers
    /// the reported count can diverge from the rows actually deleted, which
    /// is accepted best-effort behavior. With nothing expired the delete is
    /// skipped entirely.
    async fn cleanup(&self) -> StorageResult<u64> {
        self.ensure_initialized().await?;

        let cutoff = SqlValue::Integer(now_ms());
        let count_statement = format!(
            "SELECT COUNT(*) FROM {} \
             WHERE expires_at IS NOT NULL AND CAST(expires_at AS BIGINT) <= ?",
            self.table
        );
        let rows = self
            .execute(&count_statement, std::slice::from_ref(&cutoff))
            .await?;
        let count = rows
            .first()
            .and_then(|row| row.first())
            .and_then(SqlValue::as_integer)
            .ok_or_else(|| {
                StorageError::malformed_row("cleanup count query returned no usable count")
            })?;

        if count > 0 {
            let delete_statement = format!(
                "DELETE FROM {} \
                 WHERE expires_at IS NOT NULL AND CAST(expires_at AS BIGINT) <= ?",
                self.table
            );
            self.execute(&delete_statement, std::slice::from_ref(&cutoff))
                .await?;
        }

        self.observer
            .info(&format!("cleanup removed {count} expired entries"));
        debug!(count, table = %self.table, "cleanup pass complete");
        Ok(count.max(0) as u64)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Current time as integer epoch milliseconds.
fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_input("key must not be empty"));
    }
    Ok(())
}

/// Table names are interpolated into statements, so only bare identifiers
/// are accepted.
fn validate_table_name(table: &str) -> StorageResult<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        return Err(StorageError::invalid_input(format!(
            "table name '{table}' is not a bare SQL identifier"
        )));
    }
    Ok(())
}

/// Read the `expires_at` cell: NULL means no expiration, otherwise the cell
/// must hold an integer epoch-millisecond timestamp (as text or integer).
fn parse_expiry(cell: &SqlValue) -> StorageResult<Option<i64>> {
    if cell.is_null() {
        return Ok(None);
    }
    cell.as_integer()
        .map(Some)
        .ok_or_else(|| StorageError::malformed_row("expires_at column held a non-numeric value"))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::adapter::{AdapterError, Row};
    use crate::traits::KeyValueStorageExt;
    use serde_json::json;

    /// Scripted adapter: records every call, serves canned rows for
    /// selects, and can be told to fail them.
    #[derive(Default)]
    struct FakeAdapter {
        calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
        select_rows: Mutex<Vec<Row>>,
        count: Mutex<i64>,
        fail_selects: AtomicBool,
    }

    impl FakeAdapter {
        fn with_select_rows(rows: Vec<Row>) -> Arc<Self> {
            let adapter = Self::default();
            *adapter.select_rows.lock().unwrap() = rows;
            Arc::new(adapter)
        }

        fn with_count(count: i64) -> Arc<Self> {
            let adapter = Self::default();
            *adapter.count.lock().unwrap() = count;
            Arc::new(adapter)
        }

        fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
            self.calls.lock().unwrap().clone()
        }

        fn statements(&self) -> Vec<String> {
            self.calls().into_iter().map(|(stmt, _)| stmt).collect()
        }
    }

    #[async_trait]
    impl ExecuteAdapter for FakeAdapter {
        async fn execute(
            &self,
            statement: &str,
            params: &[SqlValue],
        ) -> Result<Vec<Row>, AdapterError> {
            // Force an await point so concurrent callers interleave.
            tokio::task::yield_now().await;
            self.calls
                .lock()
                .unwrap()
                .push((statement.to_string(), params.to_vec()));
            if statement.starts_with("SELECT") {
                if self.fail_selects.load(Ordering::SeqCst) {
                    return Err(AdapterError::message("connection reset"));
                }
                if statement.starts_with("SELECT COUNT") {
                    return Ok(vec![vec![SqlValue::Integer(*self.count.lock().unwrap())]]);
                }
                return Ok(self.select_rows.lock().unwrap().clone());
            }
            Ok(vec![])
        }
    }

    fn store(adapter: Arc<FakeAdapter>) -> DurableStore {
        DurableStore::with_defaults(adapter).unwrap()
    }

    #[tokio::test]
    async fn test_schema_initializes_once() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        store.get_value("a").await.unwrap();
        store.get_value("b").await.unwrap();

        let statements = adapter.statements();
        assert_eq!(statements.len(), 4);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS oauth_storage"));
        assert!(
            statements[1].starts_with("CREATE INDEX IF NOT EXISTS idx_oauth_storage_expires_at")
        );
        assert!(statements[2].starts_with("SELECT value, expires_at"));
        assert!(statements[3].starts_with("SELECT value, expires_at"));
    }

    #[tokio::test]
    async fn test_concurrent_first_use_initializes_once() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        let (a, b) = tokio::join!(store.get_value("a"), store.get_value("b"));
        a.unwrap();
        b.unwrap();

        let ddl = adapter
            .statements()
            .iter()
            .filter(|s| s.starts_with("CREATE TABLE"))
            .count();
        assert_eq!(ddl, 1);
    }

    #[tokio::test]
    async fn test_empty_key_rejected_before_any_statement() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        assert!(store.get_value("").await.unwrap_err().is_invalid_input());
        assert!(
            store
                .set_value("", StoredValue::Text("v".into()), SetOptions::new())
                .await
                .unwrap_err()
                .is_invalid_input()
        );
        assert!(store.delete_value("").await.unwrap_err().is_invalid_input());
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(adapter);
        assert_eq!(store.get_value("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_decodes_structured_value() {
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text(r#"{"did":"did:plc:abc"}"#.into()),
            SqlValue::Null,
        ]]);
        let store = store(adapter);

        let value = store.get_value("session:1").await.unwrap().unwrap();
        assert_eq!(value, StoredValue::Json(json!({"did": "did:plc:abc"})));
    }

    #[tokio::test]
    async fn test_get_falls_back_to_raw_text() {
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text("not json".into()),
            SqlValue::Null,
        ]]);
        let store = store(adapter);

        let value = store.get_value("k").await.unwrap().unwrap();
        assert_eq!(value, StoredValue::Text("not json".into()));
    }

    #[tokio::test]
    async fn test_expired_entry_reads_absent_without_deletion() {
        let past = now_ms() - 1_000;
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text("v".into()),
            SqlValue::Text(past.to_string()),
        ]]);
        let store = store(Arc::clone(&adapter));

        assert_eq!(store.get_value("k").await.unwrap(), None);
        assert!(adapter.statements().iter().all(|s| !s.starts_with("DELETE")));
    }

    #[tokio::test]
    async fn test_live_entry_with_future_expiry_reads_back() {
        let future = now_ms() + 60_000;
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text("v".into()),
            SqlValue::Text(future.to_string()),
        ]]);
        let store = store(adapter);

        assert_eq!(
            store.get_value("k").await.unwrap(),
            Some(StoredValue::Text("v".into()))
        );
    }

    #[tokio::test]
    async fn test_integer_expiry_cells_are_accepted() {
        let past = now_ms() - 1_000;
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text("v".into()),
            SqlValue::Integer(past),
        ]]);
        let store = store(adapter);

        assert_eq!(store.get_value("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expiring_exactly_now_reads_absent() {
        // Non-strict boundary: expires_at == now is already expired.
        let now = now_ms();
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text("v".into()),
            SqlValue::Text(now.to_string()),
        ]]);
        let store = store(adapter);

        assert_eq!(store.get_value("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_numeric_expiry_is_malformed_row() {
        let adapter = FakeAdapter::with_select_rows(vec![vec![
            SqlValue::Text("v".into()),
            SqlValue::Text("garbage".into()),
        ]]);
        let store = store(adapter);

        assert!(store.get_value("k").await.unwrap_err().is_malformed_row());
    }

    #[tokio::test]
    async fn test_set_upserts_with_ttl() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        let before = now_ms();
        store
            .set_value(
                "k",
                StoredValue::Json(json!({"n": 1})),
                SetOptions::new().with_ttl(Duration::from_secs(60)),
            )
            .await
            .unwrap();
        let after = now_ms();

        let (statement, params) = adapter
            .calls()
            .into_iter()
            .find(|(s, _)| s.starts_with("INSERT INTO oauth_storage"))
            .unwrap();
        assert!(statement.contains("ON CONFLICT(key) DO UPDATE"));
        assert!(!statement.contains("created_at = excluded"));
        assert_eq!(params[0], SqlValue::Text("k".into()));
        assert_eq!(params[1], SqlValue::Text(r#"{"n":1}"#.into()));

        let expires_at = params[2].as_integer().unwrap();
        assert!(expires_at >= before + 60_000 && expires_at <= after + 60_000);
        assert_eq!(params[3], params[4]);
    }

    #[tokio::test]
    async fn test_set_without_ttl_stores_null_expiry() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        store
            .set_value("k", StoredValue::Text("plain".into()), SetOptions::new())
            .await
            .unwrap();

        let (_, params) = adapter
            .calls()
            .into_iter()
            .find(|(s, _)| s.starts_with("INSERT"))
            .unwrap();
        assert_eq!(params[1], SqlValue::Text("plain".into()));
        assert_eq!(params[2], SqlValue::Null);
    }

    #[tokio::test]
    async fn test_typed_set_serializes_structured_values() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        store
            .set("k", &json!({"did": "did:plc:abc"}), SetOptions::new())
            .await
            .unwrap();

        let (_, params) = adapter
            .calls()
            .into_iter()
            .find(|(s, _)| s.starts_with("INSERT"))
            .unwrap();
        assert_eq!(params[1], SqlValue::Text(r#"{"did":"did:plc:abc"}"#.into()));
    }

    #[tokio::test]
    async fn test_delete_issues_delete_by_key() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        store.delete_value("k").await.unwrap();

        let (statement, params) = adapter.calls().into_iter().next_back().unwrap();
        assert_eq!(statement, "DELETE FROM oauth_storage WHERE key = ?");
        assert_eq!(params, vec![SqlValue::Text("k".into())]);
    }

    #[tokio::test]
    async fn test_cleanup_counts_then_deletes_with_same_cutoff() {
        let adapter = FakeAdapter::with_count(3);
        let store = store(Arc::clone(&adapter));

        assert_eq!(store.cleanup().await.unwrap(), 3);

        let calls = adapter.calls();
        let count_call = calls
            .iter()
            .find(|(s, _)| s.starts_with("SELECT COUNT"))
            .unwrap();
        let delete_call = calls.iter().find(|(s, _)| s.starts_with("DELETE")).unwrap();
        assert!(count_call.0.contains("expires_at IS NOT NULL"));
        assert_eq!(count_call.1, delete_call.1);
    }

    #[tokio::test]
    async fn test_cleanup_with_nothing_expired_skips_delete() {
        let adapter = FakeAdapter::with_count(0);
        let store = store(Arc::clone(&adapter));

        assert_eq!(store.cleanup().await.unwrap(), 0);
        assert!(adapter.statements().iter().all(|s| !s.starts_with("DELETE")));
    }

    #[tokio::test]
    async fn test_adapter_errors_pass_through() {
        let adapter = Arc::new(FakeAdapter::default());
        adapter.fail_selects.store(true, Ordering::SeqCst);
        let store = store(adapter);

        let err = store.get_value("k").await.unwrap_err();
        assert!(err.is_adapter_error());
        assert_eq!(err.to_string(), "Adapter error: connection reset");
    }

    #[derive(Default)]
    struct RecordingObserver {
        errors: Mutex<Vec<String>>,
    }

    impl StoreObserver for RecordingObserver {
        fn debug(&self, _message: &str) {}
        fn info(&self, _message: &str) {}
        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[tokio::test]
    async fn test_observer_reports_adapter_failures() {
        let adapter = Arc::new(FakeAdapter::default());
        adapter.fail_selects.store(true, Ordering::SeqCst);
        let observer = Arc::new(RecordingObserver::default());
        let store = DurableStore::new(
            adapter as Arc<dyn ExecuteAdapter>,
            DurableStoreOptions::new().observer(Arc::clone(&observer) as Arc<dyn StoreObserver>),
        )
        .unwrap();

        assert!(store.get_value("k").await.unwrap_err().is_adapter_error());

        let errors = observer.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_oversized_ttl_saturates_instead_of_wrapping() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = store(Arc::clone(&adapter));

        store
            .set_value(
                "k",
                StoredValue::Text("v".into()),
                SetOptions::new().with_ttl(Duration::MAX),
            )
            .await
            .unwrap();

        let (_, params) = adapter
            .calls()
            .into_iter()
            .find(|(s, _)| s.starts_with("INSERT"))
            .unwrap();
        assert_eq!(params[2].as_integer(), Some(i64::MAX));
    }

    #[tokio::test]
    async fn test_table_name_override_and_validation() {
        let adapter = Arc::new(FakeAdapter::default());
        let store = DurableStore::new(
            Arc::clone(&adapter) as Arc<dyn ExecuteAdapter>,
            DurableStoreOptions::new().table_name("auth_sessions"),
        )
        .unwrap();
        store.get_value("k").await.unwrap();
        assert!(adapter.statements()[0].contains("auth_sessions"));

        for bad in ["", "bad-name", "1table", "t; DROP TABLE x"] {
            let result = DurableStore::new(
                Arc::new(FakeAdapter::default()) as Arc<dyn ExecuteAdapter>,
                DurableStoreOptions::new().table_name(bad),
            );
            assert!(result.unwrap_err().is_invalid_input(), "accepted {bad:?}");
        }
    }
}
