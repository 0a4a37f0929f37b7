//! Queryable store contract
//!
//! The binder never talks to a database directly. Anything that can count and
//! window rows matching a [`Predicate`] can back an endpoint: a SQL repository,
//! a search index, or the in-memory store used by tests and the CLI.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::query::{AttributeRef, Predicate, SortDirection};

/// Resolved ordering for a data query
#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    pub attribute: AttributeRef,
    pub direction: SortDirection,
}

/// Windowed, optionally filtered and ordered read
#[derive(Debug, Clone, Copy)]
pub struct DataQuery<'a> {
    /// `None` means unfiltered
    pub predicate: Option<&'a Predicate>,
    /// `None` means store-default order
    pub order: Option<&'a SortOrder>,
    pub offset: u64,
    pub limit: u32,
}

/// Read-only store the binder executes against
#[async_trait]
pub trait QueryableStore<T: Send>: Send + Sync {
    /// Count rows of `entity` matching the predicate
    async fn count(&self, entity: &str, predicate: Option<&Predicate>) -> Result<u64, DataError>;

    /// Fetch one window of matching rows
    async fn query(&self, entity: &str, query: DataQuery<'_>) -> Result<Vec<T>, DataError>;
}
