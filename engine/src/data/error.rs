//! Unified error type for the data layer
//!
//! Store implementations report failures through [`DataError`], which the
//! binder wraps into a store failure for the caller.

use thiserror::Error;

/// Error raised by a queryable store
#[derive(Error, Debug)]
pub enum DataError {
    /// The store holds no collection for the entity type
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Row could not be converted for evaluation
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s on {backend}")]
    Timeout {
        backend: &'static str,
        timeout_secs: u64,
    },

    /// Backend not available
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// Query rejected by the backend
    #[error("Query failed on {backend}: {reason}")]
    Query {
        backend: &'static str,
        reason: String,
    },
}

impl DataError {
    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout_secs: u64) -> Self {
        Self::Timeout {
            backend,
            timeout_secs,
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Create a query failure
    pub fn query(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Query {
            backend,
            reason: reason.into(),
        }
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::BackendUnavailable { .. })
    }
}
