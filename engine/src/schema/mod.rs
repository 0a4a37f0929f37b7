//! Entity schema model
//!
//! Explicit schema descriptions stand in for runtime introspection: each entity
//! type declares its attributes, their value types, and which of them can be
//! filtered from request parameters (with what operator and parameter alias).
//!
//! ## Usage
//!
//! ```
//! use querybind::schema::{AttributeDef, EntitySchema, FilterOp, SchemaRegistry, ValueType};
//!
//! let registry = SchemaRegistry::builder()
//!     .register(
//!         EntitySchema::new("User")
//!             .attribute(AttributeDef::new("name", ValueType::String).filterable(FilterOp::Like))
//!             .attribute(AttributeDef::new("role", ValueType::String).filterable(FilterOp::In).param("roles")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let descriptors = registry.discover("User").unwrap();
//! assert_eq!(descriptors[1].param_name, "roles");
//! ```

mod registry;
mod types;

pub use registry::{PathError, ResolvedAttribute, SchemaError, SchemaRegistry, SchemaRegistryBuilder};
pub use types::{AttributeDef, AttributeDescriptor, EntitySchema, FilterOp, FilterSpec, ValueType};
