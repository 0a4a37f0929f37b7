use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::query::{BindingConfig, BindingRegistry, SortDirection};
use crate::schema::{EntitySchema, SchemaRegistry};

use super::cli::CliConfig;
use super::constants::{CONFIG_FILE_NAME, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_SORT};

// =============================================================================
// File Config
// =============================================================================

/// Binding settings as written in the config file; every field is optional so
/// `defaults` and per-endpoint sections can be layered
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BindingFileConfig {
    pub entity: Option<String>,
    pub default_page_size: Option<u32>,
    pub max_page_size: Option<u32>,
    pub search_attributes: Option<Vec<String>>,
    pub default_sort: Option<String>,
    pub default_direction: Option<SortDirection>,
}

impl BindingFileConfig {
    /// Merge another section into this one (other takes precedence)
    fn merge(&mut self, other: BindingFileConfig) {
        if other.entity.is_some() {
            self.entity = other.entity;
        }
        if other.default_page_size.is_some() {
            self.default_page_size = other.default_page_size;
        }
        if other.max_page_size.is_some() {
            self.max_page_size = other.max_page_size;
        }
        if other.search_attributes.is_some() {
            self.search_attributes = other.search_attributes;
        }
        if other.default_sort.is_some() {
            self.default_sort = other.default_sort;
        }
        if other.default_direction.is_some() {
            self.default_direction = other.default_direction;
        }
    }

    /// Fill the remaining gaps with built-in defaults
    fn into_binding(self, endpoint: &str) -> Result<BindingConfig> {
        let entity = self
            .entity
            .with_context(|| format!("Endpoint '{}' does not name an entity", endpoint))?;

        Ok(BindingConfig {
            entity,
            default_page_size: self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            max_page_size: self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE),
            search_attributes: self.search_attributes.unwrap_or_default(),
            default_sort: self
                .default_sort
                .unwrap_or_else(|| DEFAULT_SORT.to_string()),
            default_direction: self.default_direction.unwrap_or_default(),
        })
    }
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Layered under every endpoint
    pub defaults: Option<BindingFileConfig>,
    /// Entity schemas keyed by type name
    #[serde(default)]
    pub entities: IndexMap<String, EntitySchema>,
    /// Endpoint name to binding
    #[serde(default)]
    pub endpoints: IndexMap<String, BindingFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Final merged application configuration
#[derive(Debug)]
pub struct AppConfig {
    pub schemas: SchemaRegistry,
    pub bindings: BindingRegistry,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Built-in defaults
    /// 2. `defaults` section of the config file
    /// 3. Per-endpoint section
    ///
    /// The file is `--config` / `QUERYBIND_CONFIG` when given, otherwise
    /// `querybind.json` in the working directory if it exists.
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => {
                tracing::warn!(file = CONFIG_FILE_NAME, "No config file found, nothing is bound");
                FileConfig::default()
            }
        };

        Self::from_file_config(file_config)
    }

    /// Build registries from a parsed config file
    pub fn from_file_config(file_config: FileConfig) -> Result<Self> {
        let mut builder = SchemaRegistry::builder();
        for (name, mut schema) in file_config.entities {
            if schema.name.is_empty() {
                schema.name = name;
            } else if schema.name != name {
                anyhow::bail!(
                    "Entity '{}' is declared under key '{}'",
                    schema.name,
                    name
                );
            }
            builder = builder.register(schema);
        }
        let schemas = builder.build().context("Invalid entity schemas")?;

        let defaults = file_config.defaults.unwrap_or_default();
        let mut bindings = BindingRegistry::new();
        for (endpoint, section) in file_config.endpoints {
            let mut layered = defaults.clone();
            layered.merge(section);
            let config = layered.into_binding(&endpoint)?;

            if !schemas.contains(&config.entity) {
                anyhow::bail!(
                    "Endpoint '{}' binds unknown entity '{}'",
                    endpoint,
                    config.entity
                );
            }
            bindings
                .register(endpoint.clone(), config)
                .with_context(|| format!("Invalid binding for endpoint '{}'", endpoint))?;
        }

        tracing::debug!(
            entities = schemas.entity_names().len(),
            endpoints = bindings.len(),
            "Configuration loaded"
        );

        Ok(Self { schemas, bindings })
    }
}
