//! Injectable diagnostic logging hook.
//!
//! The store reports operation boundaries through a [`StoreObserver`]. The
//! hook is purely observational: it never affects control flow, return
//! values, or error state. The default is a no-op; [`TracingObserver`]
//! forwards to the `tracing` ecosystem.

/// Diagnostic observer invoked at operation boundaries.
pub trait StoreObserver: Send + Sync {
    /// Fine-grained diagnostics (per-operation detail).
    fn debug(&self, message: &str);

    /// Notable lifecycle events (schema initialization, cleanup results).
    fn info(&self, message: &str);

    /// Failures about to be surfaced to the caller.
    fn error(&self, message: &str);
}

/// The default observer: discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StoreObserver for NoopObserver {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// An observer that forwards to [`tracing`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "seshat_storage", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "seshat_storage", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "seshat_storage", "{message}");
    }
}

// =============================================================================
// Tests
// =============================================================================
