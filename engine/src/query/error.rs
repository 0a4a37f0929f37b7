//! Binding errors
//!
//! Only two kinds of failure escape `execute`: configuration problems, raised
//! before the store is touched, and store failures. Everything else (bad filter
//! values, unknown search or sort attributes) is recovered locally.

use thiserror::Error;

use crate::data::DataError;

/// Error returned by query binding execution
#[derive(Error, Debug)]
pub enum QueryBindError {
    /// The endpoint has no binding configuration
    #[error("No query binding registered for endpoint '{0}'")]
    MissingBinding(String),

    /// The configured entity type is not registered
    #[error("Entity type '{0}' is not registered")]
    UnknownEntity(String),

    /// The binding configuration itself is invalid
    #[error("Invalid query binding for entity '{entity}': {reason}")]
    InvalidConfig { entity: String, reason: String },

    /// Count or data query failed
    #[error("Query binding failed for entity '{entity}': {source}")]
    Store {
        entity: String,
        #[source]
        source: DataError,
    },
}

impl QueryBindError {
    pub fn invalid_config(entity: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn store(entity: &str, source: DataError) -> Self {
        Self::Store {
            entity: entity.to_string(),
            source,
        }
    }

    /// Configuration errors are fatal and never worth retrying
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Store { .. })
    }

    /// Whether a retry by the caller might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binding_display() {
        let err = QueryBindError::MissingBinding("/users".to_string());
        assert_eq!(err.to_string(), "No query binding registered for endpoint '/users'");
        assert!(err.is_configuration());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_store_error_is_not_configuration() {
        let err = QueryBindError::store("User", DataError::timeout("memory", 5));
        assert!(!err.is_configuration());
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "Query binding failed for entity 'User': Query timeout after 5s on memory"
        );
    }
}
