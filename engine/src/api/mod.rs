//! HTTP adapters
//!
//! Glue for serving bindings from axum handlers: a request-parameter
//! extractor and the error response mapping. Routing is left to the caller.

pub mod extractors;
pub mod types;

pub use extractors::QueryParams;
pub use types::ApiError;
