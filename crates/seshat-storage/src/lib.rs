//! # seshat-storage
//!
//! TTL-aware key-value storage for short-lived authorization session state
//! (tokens, session records) in OAuth-style authentication flows.
//!
//! The crate exposes one storage contract over two backends:
//!
//! - [`MemoryStore`] - a transient in-process map, suitable for tests and
//!   single-process deployments
//! - [`DurableStore`] - a persistent relational table driven through a
//!   pluggable [`ExecuteAdapter`]
//!
//! Values are opaque to the store: strings are persisted verbatim, anything
//! else is serialized to JSON text, and reads resolve the stored text back
//! into structured data with a raw-text fallback (see [`StoredValue`]).
//! Expiration is logical first (expired entries read as absent) and physical
//! only on [`cleanup`](KeyValueStorage::cleanup) or explicit delete.
//!
//! ## Modules
//!
//! - [`adapter`] - the execution adapter boundary contract
//! - [`durable`] - the durable TTL store engine
//! - [`memory`] - the in-process map backend
//! - [`observer`] - injectable diagnostic logging hook
//! - [`traits`] - the backend-agnostic storage contract
//! - [`value`] - the stored value model
//!
//! ## Example
//!
//! ```
//! use seshat_storage::{KeyValueStorageExt, MemoryStore, SetOptions};
//!
//! # async fn example() -> seshat_storage::StorageResult<()> {
//! let store = MemoryStore::new();
//! store
//!     .set("session:1", &serde_json::json!({"did": "did:plc:abc"}), SetOptions::new())
//!     .await?;
//! let session: Option<serde_json::Value> = store.get("session:1").await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod durable;
pub mod error;
pub mod memory;
pub mod observer;
pub mod traits;
pub mod value;

pub use adapter::{AdapterError, ExecuteAdapter, Row, SqlValue};
pub use durable::{DEFAULT_TABLE, DurableStore, DurableStoreOptions};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use observer::{NoopObserver, StoreObserver, TracingObserver};
pub use traits::{KeyValueStorage, KeyValueStorageExt, SetOptions};
pub use value::StoredValue;
