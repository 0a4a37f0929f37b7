//! Schema type definitions
//!
//! Explicit description of an entity type's attributes, built once when the
//! entity is registered and shared read-only afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared value type of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueType {
    String,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Decimal,
    Date,
    DateTime,
    /// Enumeration with canonical uppercase variant names, in declaration order
    Enum {
        variants: Vec<String>,
    },
    /// Embedded or related entity, resolved through the schema registry
    Entity {
        entity: String,
    },
}

impl ValueType {
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity {
            entity: name.into(),
        }
    }

    /// Whether values of this type can be compared, filtered and sorted
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Entity { .. })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::I32 => write!(f, "i32"),
            ValueType::I64 => write!(f, "i64"),
            ValueType::U32 => write!(f, "u32"),
            ValueType::U64 => write!(f, "u64"),
            ValueType::F32 => write!(f, "f32"),
            ValueType::F64 => write!(f, "f64"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Decimal => write!(f, "decimal"),
            ValueType::Date => write!(f, "date"),
            ValueType::DateTime => write!(f, "date_time"),
            ValueType::Enum { .. } => write!(f, "enum"),
            ValueType::Entity { entity } => write!(f, "entity {}", entity),
        }
    }
}

/// Comparison operator applied when a filter parameter is present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact match: `?status=active`, with `null` / `!null` nullity shortcuts
    #[default]
    Equals,
    /// Case-insensitive substring: `?name=john` matches `%john%`
    Like,
    GreaterThan,
    LessThan,
    /// Comma-separated membership: `?status=active,pending`
    In,
    /// Inclusive range from a comma-joined pair: `?age=18,65`
    Between,
    IsNull,
    IsNotNull,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Equals => write!(f, "equals"),
            FilterOp::Like => write!(f, "like"),
            FilterOp::GreaterThan => write!(f, "greater_than"),
            FilterOp::LessThan => write!(f, "less_than"),
            FilterOp::In => write!(f, "in"),
            FilterOp::Between => write!(f, "between"),
            FilterOp::IsNull => write!(f, "is_null"),
            FilterOp::IsNotNull => write!(f, "is_not_null"),
        }
    }
}

/// Marks an attribute as filterable
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub op: FilterOp,
    /// Request parameter alias; the attribute name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// A named, typed attribute of an entity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttributeDef {
    pub name: String,
    #[serde(flatten)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            filter: None,
        }
    }

    /// Mark the attribute filterable with the given operator
    pub fn filterable(mut self, op: FilterOp) -> Self {
        self.filter.get_or_insert_with(FilterSpec::default).op = op;
        self
    }

    /// Override the request parameter name (implies filterable)
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.filter.get_or_insert_with(FilterSpec::default).param = Some(param.into());
        self
    }
}

/// Schema of one entity type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntitySchema {
    #[serde(default)]
    pub name: String,
    /// Ancestor entity whose attributes are inherited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            attributes: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Attribute declared directly on this type (inherited ones are not searched)
    pub fn own_attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Filterable attribute as seen by request binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeDescriptor {
    pub attribute_name: String,
    pub param_name: String,
    pub value_type: ValueType,
    pub operator: FilterOp,
}

impl AttributeDescriptor {
    /// Build a descriptor for a filterable attribute; `None` when not filterable
    pub fn from_attribute(attribute: &AttributeDef) -> Option<Self> {
        let filter = attribute.filter.as_ref()?;
        let param_name = filter
            .param
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&attribute.name)
            .to_string();
        Some(Self {
            attribute_name: attribute.name.clone(),
            param_name,
            value_type: attribute.value_type.clone(),
            operator: filter.op,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_def_parse_scalar() {
        let json = r#"{"name": "age", "type": "i32", "filter": {"op": "greater_than"}}"#;
        let attr: AttributeDef = serde_json::from_str(json).unwrap();

        assert_eq!(attr.name, "age");
        assert_eq!(attr.value_type, ValueType::I32);
        assert_eq!(attr.filter.unwrap().op, FilterOp::GreaterThan);
    }

    #[test]
    fn test_attribute_def_parse_enum() {
        let json = r#"{"name": "status", "type": "enum", "variants": ["ACTIVE", "PENDING"]}"#;
        let attr: AttributeDef = serde_json::from_str(json).unwrap();

        assert_eq!(attr.value_type, ValueType::enumeration(["ACTIVE", "PENDING"]));
        assert!(attr.filter.is_none());
    }

    #[test]
    fn test_attribute_def_parse_entity() {
        let json = r#"{"name": "address", "type": "entity", "entity": "Address"}"#;
        let attr: AttributeDef = serde_json::from_str(json).unwrap();

        assert_eq!(attr.value_type, ValueType::entity("Address"));
        assert!(!attr.value_type.is_scalar());
    }

    #[test]
    fn test_filter_spec_defaults_to_equals() {
        let json = r#"{"name": "email", "type": "string", "filter": {}}"#;
        let attr: AttributeDef = serde_json::from_str(json).unwrap();
        assert_eq!(attr.filter.unwrap().op, FilterOp::Equals);
    }

    #[test]
    fn test_descriptor_param_defaults_to_name() {
        let attr = AttributeDef::new("status", ValueType::String).filterable(FilterOp::In);
        let descriptor = AttributeDescriptor::from_attribute(&attr).unwrap();

        assert_eq!(descriptor.attribute_name, "status");
        assert_eq!(descriptor.param_name, "status");
        assert_eq!(descriptor.operator, FilterOp::In);
    }

    #[test]
    fn test_descriptor_param_override() {
        let attr = AttributeDef::new("role", ValueType::String)
            .filterable(FilterOp::In)
            .param("roles");
        let descriptor = AttributeDescriptor::from_attribute(&attr).unwrap();
        assert_eq!(descriptor.param_name, "roles");
    }

    #[test]
    fn test_descriptor_blank_param_falls_back_to_name() {
        let attr = AttributeDef::new("role", ValueType::String).param("  ");
        let descriptor = AttributeDescriptor::from_attribute(&attr).unwrap();
        assert_eq!(descriptor.param_name, "role");
        assert_eq!(descriptor.operator, FilterOp::Equals);
    }

    #[test]
    fn test_non_filterable_has_no_descriptor() {
        let attr = AttributeDef::new("secret", ValueType::String);
        assert!(AttributeDescriptor::from_attribute(&attr).is_none());
    }

    #[test]
    fn test_filter_op_display() {
        assert_eq!(FilterOp::IsNotNull.to_string(), "is_not_null");
        assert_eq!(FilterOp::GreaterThan.to_string(), "greater_than");
    }
}
