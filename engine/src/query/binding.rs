//! Per-endpoint binding configuration
//!
//! A [`BindingConfig`] is the declarative description of one endpoint: which
//! entity it lists, its pagination bounds, searchable attributes and default
//! ordering. Configs are validated once and never change afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::error::QueryBindError;
use crate::core::constants::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_SORT};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive `"desc"` selects descending, anything else ascending
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        Self::from_param(&value)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

fn validate_page_bounds(config: &BindingConfig) -> Result<(), ValidationError> {
    if config.max_page_size < config.default_page_size {
        return Err(ValidationError::new("max_page_size_range").with_message(
            format!(
                "max_page_size ({}) must be >= default_page_size ({})",
                config.max_page_size, config.default_page_size
            )
            .into(),
        ));
    }
    Ok(())
}

/// Declarative binding of one endpoint to an entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_page_bounds"))]
pub struct BindingConfig {
    /// Entity type name, looked up in the schema registry
    #[validate(length(min = 1))]
    pub entity: String,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1))]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Attribute paths matched by the `search` parameter (OR-ed together)
    #[serde(default)]
    pub search_attributes: Vec<String>,
    #[serde(default = "default_sort")]
    pub default_sort: String,
    #[serde(default)]
    pub default_direction: SortDirection,
}

impl BindingConfig {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            search_attributes: Vec::new(),
            default_sort: DEFAULT_SORT.to_string(),
            default_direction: SortDirection::Asc,
        }
    }

    pub fn page_sizes(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    pub fn search<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = field.into();
        self.default_direction = direction;
        self
    }

    /// Check page-size bounds, mapping violations to a configuration error
    pub fn check(&self) -> Result<(), QueryBindError> {
        self.validate()
            .map_err(|e| QueryBindError::invalid_config(&self.entity, e.to_string()))
    }
}

/// Endpoint name to binding configuration
#[derive(Debug, Default)]
pub struct BindingRegistry {
    endpoints: IndexMap<String, BindingConfig>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding after validating it; replaces any previous binding
    pub fn register(
        &mut self,
        endpoint: impl Into<String>,
        config: BindingConfig,
    ) -> Result<(), QueryBindError> {
        config.check()?;
        let endpoint = endpoint.into();
        if self.endpoints.insert(endpoint.clone(), config).is_some() {
            tracing::warn!(endpoint = %endpoint, "Replacing existing endpoint binding");
        }
        Ok(())
    }

    pub fn get(&self, endpoint: &str) -> Result<&BindingConfig, QueryBindError> {
        self.endpoints
            .get(endpoint)
            .ok_or_else(|| QueryBindError::MissingBinding(endpoint.to_string()))
    }

    /// Endpoints in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingConfig)> {
        self.endpoints.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
