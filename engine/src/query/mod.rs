//! Query binding
//!
//! Turns a flat map of request parameters into a paginated, sorted, filtered
//! query against a [`QueryableStore`](crate::data::QueryableStore):
//! - `params` - pagination, sort, search and filter resolution
//! - `coerce` - raw string to typed value conversion
//! - `builder` - predicate construction from search and filters
//! - `service` - orchestration of count and data queries
//! - `result` - the page returned to callers

pub mod binding;
pub mod builder;
pub mod coerce;
pub mod error;
pub mod params;
pub mod predicate;
pub mod result;
pub mod service;
pub mod value;

pub use binding::{BindingConfig, BindingRegistry, SortDirection};
pub use builder::{FilterError, PredicateBuilder};
pub use coerce::{CoercionError, coerce};
pub use error::QueryBindError;
pub use params::{ActiveFilter, RawParams, ResolvedRequest, resolve};
pub use predicate::{AttributeRef, Predicate, RangeBound};
pub use result::ResultPage;
pub use service::{PreparedQuery, QueryBindService};
pub use value::Value;
