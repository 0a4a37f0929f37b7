//! Data access layer

pub mod error;
pub mod memory;
pub mod traits;

pub use error::DataError;
pub use memory::MemoryStore;
pub use traits::{DataQuery, QueryableStore, SortOrder};
