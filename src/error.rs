//! Crate-wide error type.
//!
//! Every error that crosses a component boundary is a [`StoreError`]. Each
//! variant carries enough context (the operation name and the involved
//! [`crate::model::PageIndex`] or segment id) for a caller to report a
//! useful message without re-deriving it.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The taxonomy of §7: every failure mode the store, the authorization
/// layer, the renderer, and the tool surface can produce.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A page or segment lookup found nothing.
    #[error("{op}: not found: {target}")]
    NotFound {
        /// Name of the operation that failed.
        op: &'static str,
        /// The index or segment id that was missing.
        target: String,
    },

    /// An index or segment id that already exists was inserted again.
    #[error("{op}: duplicate: {target}")]
    Duplicate {
        /// Name of the operation that failed.
        op: &'static str,
        /// The index or segment id that collided.
        target: String,
    },

    /// A structural rule was broken (orphan page, wrong parent type,
    /// cross-segment move, cycle, empty name).
    #[error("{op}: invariant violation on {target}: {reason}")]
    InvariantViolation {
        /// Name of the operation that failed.
        op: &'static str,
        /// The index involved.
        target: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// The authorization layer rejected the caller.
    #[error("{op}: permission denied on {target}")]
    PermissionDenied {
        /// Name of the operation that was rejected.
        op: &'static str,
        /// The index or segment id involved.
        target: String,
    },

    /// Invariant 8: a System segment's root may not be hidden.
    #[error("{op}: system segment root {target} cannot be hidden")]
    SystemRootProtected {
        /// Name of the operation that was rejected.
        op: &'static str,
        /// The protected root index.
        target: String,
    },

    /// The durable storage medium failed.
    #[error("{op}: storage error for {target}: {source}")]
    StorageError {
        /// Name of the operation that failed.
        op: &'static str,
        /// The index involved.
        target: String,
        /// Underlying I/O or (de)serialization failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A sandboxed tool-surface script failed: syntax, runtime exception,
    /// or an underlying tool-call error.
    #[error("script error calling {target}: {reason}")]
    ScriptError {
        /// The tool-surface call name the script was invoking.
        target: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// The renderer's token estimate exceeds the caller-supplied ceiling
    /// even after auto-collapse has exhausted its DetailPages.
    #[error("rendered token estimate {estimate} exceeds budget {budget}")]
    TokenBudgetExceeded {
        /// The post-collapse token estimate.
        estimate: usize,
        /// The ceiling that was requested.
        budget: usize,
    },
}

impl StoreError {
    /// Wraps an I/O error from the `op` operation against `target` as a
    /// [`StoreError::StorageError`].
    pub fn storage(op: &'static str, target: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::StorageError {
            op,
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a JSON (de)serialization error as a [`StoreError::StorageError`].
    pub fn serde(op: &'static str, target: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::StorageError {
            op,
            target: target.into(),
            source: Box::new(source),
        }
    }
}
