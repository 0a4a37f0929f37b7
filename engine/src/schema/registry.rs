//! Schema registry
//!
//! Holds every registered entity schema and the filter descriptors discovered
//! for it. The registry is assembled once through [`SchemaRegistryBuilder`] and
//! is immutable afterwards, so it can be shared behind an `Arc` by any number of
//! concurrent requests without locking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use super::types::{AttributeDef, AttributeDescriptor, EntitySchema, ValueType};
use crate::core::constants::RESERVED_PARAMS;

/// Invalid schema registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Entity '{0}' is registered more than once")]
    Duplicate(String),

    #[error("Entity '{entity}' extends unknown entity '{parent}'")]
    UnknownParent { entity: String, parent: String },

    #[error("Entity '{0}' has a cyclic inheritance chain")]
    InheritanceCycle(String),

    #[error("Attribute '{entity}.{attribute}' references unknown entity '{target}'")]
    UnknownEntityType {
        entity: String,
        attribute: String,
        target: String,
    },

    #[error("Entity name cannot be empty")]
    EmptyName,
}

/// Attribute path that does not resolve against an entity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Entity type '{0}' is not registered")]
    UnknownEntity(String),

    #[error("Attribute '{segment}' does not exist on '{entity}'")]
    UnknownAttribute { entity: String, segment: String },

    #[error("Cannot traverse into '{segment}' of scalar attribute path '{path}'")]
    NotTraversable { path: String, segment: String },

    #[error("Attribute path cannot be empty")]
    Empty,
}

/// Attribute reached by resolving a dotted path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub path: String,
    pub value_type: ValueType,
}

#[derive(Debug)]
struct RegisteredEntity {
    schema: EntitySchema,
    /// Inheritance chain, root ancestor first and this entity last
    lineage: Vec<String>,
    descriptors: Arc<[AttributeDescriptor]>,
}

/// Immutable lookup of entity schemas by type name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, RegisteredEntity>,
}

/// Collects schemas before validation
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: Vec<EntitySchema>,
}

impl SchemaRegistryBuilder {
    pub fn register(mut self, schema: EntitySchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Validate all schemas and discover their filterable attributes
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut by_name: HashMap<String, EntitySchema> = HashMap::new();
        for schema in self.schemas {
            if schema.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if by_name.contains_key(&schema.name) {
                return Err(SchemaError::Duplicate(schema.name));
            }
            by_name.insert(schema.name.clone(), schema);
        }

        for schema in by_name.values() {
            for attribute in &schema.attributes {
                if let ValueType::Entity { entity } = &attribute.value_type
                    && !by_name.contains_key(entity)
                {
                    return Err(SchemaError::UnknownEntityType {
                        entity: schema.name.clone(),
                        attribute: attribute.name.clone(),
                        target: entity.clone(),
                    });
                }
            }
        }

        let mut lineages = HashMap::with_capacity(by_name.len());
        for name in by_name.keys() {
            lineages.insert(name.clone(), lineage(&by_name, name)?);
        }

        let mut entities = HashMap::with_capacity(by_name.len());
        for (name, lineage) in lineages {
            let descriptors = discover(&by_name, &lineage);
            tracing::debug!(
                entity = %name,
                filters = descriptors.len(),
                "Discovered filterable attributes"
            );
            if let Some(schema) = by_name.get(&name) {
                entities.insert(
                    name,
                    RegisteredEntity {
                        schema: schema.clone(),
                        lineage,
                        descriptors: descriptors.into(),
                    },
                );
            }
        }

        Ok(SchemaRegistry { entities })
    }
}

/// Walk `extends` links up to the root; returns root-first order
fn lineage(
    schemas: &HashMap<String, EntitySchema>,
    name: &str,
) -> Result<Vec<String>, SchemaError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(name.to_string());

    while let Some(entity) = current {
        if !seen.insert(entity.clone()) {
            return Err(SchemaError::InheritanceCycle(name.to_string()));
        }
        let schema = schemas
            .get(&entity)
            .ok_or_else(|| SchemaError::UnknownParent {
                entity: chain.last().cloned().unwrap_or_else(|| name.to_string()),
                parent: entity.clone(),
            })?;
        current = schema.extends.clone();
        chain.push(entity);
    }

    chain.reverse();
    Ok(chain)
}

/// Collect filterable attributes across the lineage.
///
/// Ancestors are visited first, declaration order within each type. When two
/// attributes share a parameter name the later one replaces the earlier one in
/// place, so a descendant overrides what it inherits.
fn discover(
    schemas: &HashMap<String, EntitySchema>,
    lineage: &[String],
) -> Vec<AttributeDescriptor> {
    let mut descriptors: Vec<AttributeDescriptor> = Vec::new();

    let attributes = lineage
        .iter()
        .filter_map(|name| schemas.get(name))
        .flat_map(|schema| schema.attributes.iter());

    for descriptor in attributes.filter_map(AttributeDescriptor::from_attribute) {
        if RESERVED_PARAMS.contains(&descriptor.param_name.as_str()) {
            tracing::warn!(
                attribute = %descriptor.attribute_name,
                param = %descriptor.param_name,
                "Filter uses a reserved parameter name, skipping"
            );
            continue;
        }

        match descriptors
            .iter()
            .position(|d| d.param_name == descriptor.param_name)
        {
            Some(index) => {
                tracing::warn!(
                    param = %descriptor.param_name,
                    replaced = %descriptors[index].attribute_name,
                    attribute = %descriptor.attribute_name,
                    "Filter parameter name collision, later attribute wins"
                );
                descriptors[index] = descriptor;
            }
            None => descriptors.push(descriptor),
        }
    }

    descriptors
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn get(&self, entity: &str) -> Option<&EntitySchema> {
        self.entities.get(entity).map(|e| &e.schema)
    }

    /// Registered entity names, sorted
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Filterable attributes of an entity in discovery order
    pub fn discover(&self, entity: &str) -> Result<Arc<[AttributeDescriptor]>, PathError> {
        self.entities
            .get(entity)
            .map(|e| Arc::clone(&e.descriptors))
            .ok_or_else(|| PathError::UnknownEntity(entity.to_string()))
    }

    /// Find an attribute on an entity, including inherited ones.
    ///
    /// The closest declaration wins when a descendant redeclares an attribute.
    pub fn find_attribute(&self, entity: &str, name: &str) -> Result<&AttributeDef, PathError> {
        let registered = self
            .entities
            .get(entity)
            .ok_or_else(|| PathError::UnknownEntity(entity.to_string()))?;

        registered
            .lineage
            .iter()
            .rev()
            .filter_map(|ancestor| self.entities.get(ancestor))
            .find_map(|ancestor| ancestor.schema.own_attribute(name))
            .ok_or_else(|| PathError::UnknownAttribute {
                entity: entity.to_string(),
                segment: name.to_string(),
            })
    }

    /// Resolve a dot-separated attribute path such as `address.city`
    pub fn resolve_path(&self, entity: &str, path: &str) -> Result<ResolvedAttribute, PathError> {
        if path.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut current_entity = entity.to_string();
        let mut value_type: Option<ValueType> = None;
        let mut walked: Vec<&str> = Vec::new();

        for segment in path.split('.') {
            if let Some(previous) = value_type.take() {
                match previous {
                    ValueType::Entity { entity } => current_entity = entity,
                    _ => {
                        return Err(PathError::NotTraversable {
                            path: walked.join("."),
                            segment: segment.to_string(),
                        });
                    }
                }
            }
            let attribute = self.find_attribute(&current_entity, segment)?;
            value_type = Some(attribute.value_type.clone());
            walked.push(segment);
        }

        value_type
            .map(|value_type| ResolvedAttribute {
                path: path.to_string(),
                value_type,
            })
            .ok_or(PathError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FilterOp;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .register(
                EntitySchema::new("Base")
                    .attribute(AttributeDef::new("id", ValueType::I64).filterable(FilterOp::Equals))
                    .attribute(
                        AttributeDef::new("created_at", ValueType::DateTime)
                            .filterable(FilterOp::Between),
                    ),
            )
            .register(
                EntitySchema::new("Address")
                    .attribute(AttributeDef::new("city", ValueType::String))
                    .attribute(AttributeDef::new("zip", ValueType::String)),
            )
            .register(
                EntitySchema::new("User")
                    .extends("Base")
                    .attribute(AttributeDef::new("name", ValueType::String).filterable(FilterOp::Like))
                    .attribute(AttributeDef::new("status", ValueType::String).filterable(FilterOp::In))
                    .attribute(AttributeDef::new("email", ValueType::String))
                    .attribute(AttributeDef::new("address", ValueType::entity("Address"))),
            )
            .build()
            .unwrap()
    }

    fn params(descriptors: &[AttributeDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.param_name.as_str()).collect()
    }

    #[test]
    fn test_discover_includes_ancestors_first() {
        let registry = registry();
        let descriptors = registry.discover("User").unwrap();
        assert_eq!(params(&descriptors), vec!["id", "created_at", "name", "status"]);
    }

    #[test]
    fn test_discover_is_stable_across_calls() {
        let registry = registry();
        let first = registry.discover("User").unwrap();
        let second = registry.discover("User").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_discover_unknown_entity() {
        let registry = registry();
        assert_eq!(
            registry.discover("Nope").unwrap_err(),
            PathError::UnknownEntity("Nope".to_string())
        );
    }

    #[test]
    fn test_discover_collision_later_wins_in_place() {
        let registry = SchemaRegistry::builder()
            .register(
                EntitySchema::new("Base")
                    .attribute(AttributeDef::new("state", ValueType::String).param("status"))
                    .attribute(AttributeDef::new("id", ValueType::I64).filterable(FilterOp::Equals)),
            )
            .register(
                EntitySchema::new("Order")
                    .extends("Base")
                    .attribute(
                        AttributeDef::new("status", ValueType::String).filterable(FilterOp::In),
                    ),
            )
            .build()
            .unwrap();

        let descriptors = registry.discover("Order").unwrap();
        assert_eq!(params(&descriptors), vec!["status", "id"]);
        assert_eq!(descriptors[0].attribute_name, "status");
        assert_eq!(descriptors[0].operator, FilterOp::In);
    }

    #[test]
    fn test_discover_skips_reserved_param_names() {
        let registry = SchemaRegistry::builder()
            .register(
                EntitySchema::new("Page")
                    .attribute(AttributeDef::new("page", ValueType::I32).filterable(FilterOp::Equals))
                    .attribute(AttributeDef::new("title", ValueType::String).param("search"))
                    .attribute(AttributeDef::new("slug", ValueType::String).filterable(FilterOp::Equals)),
            )
            .build()
            .unwrap();

        assert_eq!(params(&registry.discover("Page").unwrap()), vec!["slug"]);
    }

    #[test]
    fn test_build_rejects_unknown_parent() {
        let err = SchemaRegistry::builder()
            .register(EntitySchema::new("User").extends("Missing"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownParent {
                entity: "User".to_string(),
                parent: "Missing".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_cycle() {
        let err = SchemaRegistry::builder()
            .register(EntitySchema::new("A").extends("B"))
            .register(EntitySchema::new("B").extends("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle(_)));
    }

    #[test]
    fn test_build_rejects_duplicate() {
        let err = SchemaRegistry::builder()
            .register(EntitySchema::new("A"))
            .register(EntitySchema::new("A"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::Duplicate("A".to_string()));
    }

    #[test]
    fn test_build_rejects_unknown_embedded_type() {
        let err = SchemaRegistry::builder()
            .register(
                EntitySchema::new("User")
                    .attribute(AttributeDef::new("address", ValueType::entity("Address"))),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownEntityType { .. }));
    }

    #[test]
    fn test_resolve_simple_and_inherited() {
        let registry = registry();
        assert_eq!(
            registry.resolve_path("User", "email").unwrap().value_type,
            ValueType::String
        );
        assert_eq!(
            registry.resolve_path("User", "id").unwrap().value_type,
            ValueType::I64
        );
    }

    #[test]
    fn test_resolve_nested_path() {
        let registry = registry();
        let resolved = registry.resolve_path("User", "address.city").unwrap();
        assert_eq!(resolved.path, "address.city");
        assert_eq!(resolved.value_type, ValueType::String);
    }

    #[test]
    fn test_resolve_unknown_segment() {
        let registry = registry();
        assert_eq!(
            registry.resolve_path("User", "address.country").unwrap_err(),
            PathError::UnknownAttribute {
                entity: "Address".to_string(),
                segment: "country".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_through_scalar_fails() {
        let registry = registry();
        assert_eq!(
            registry.resolve_path("User", "email.domain").unwrap_err(),
            PathError::NotTraversable {
                path: "email".to_string(),
                segment: "domain".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_empty_path() {
        let registry = registry();
        assert_eq!(registry.resolve_path("User", " ").unwrap_err(), PathError::Empty);
    }

    #[test]
    fn test_entity_names_sorted() {
        assert_eq!(registry().entity_names(), vec!["Address", "Base", "User"]);
    }
}
