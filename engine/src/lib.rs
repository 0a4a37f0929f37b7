//! Declarative query binding
//!
//! Binds flat request parameters to filtered, searched, sorted and paginated
//! queries, driven by entity schemas and per-endpoint binding configuration.
//!
//! - `schema` - entity schemas and filter discovery
//! - `query` - parameter resolution, predicate building and execution
//! - `data` - the queryable store contract and an in-memory store
//! - `api` - axum extractor and error responses
//! - `core` - CLI, configuration and application entry point

pub mod api;
pub mod core;
pub mod data;
pub mod query;
pub mod schema;
pub mod utils;

mod app;
