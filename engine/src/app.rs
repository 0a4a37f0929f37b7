//! Core application

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::MemoryStore;
use crate::query::{BindingConfig, QueryBindService, RawParams};

pub struct CoreApp {
    pub service: QueryBindService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;

        match command {
            Some(Commands::Query {
                endpoint,
                data,
                params,
            }) => {
                let mut raw = RawParams::with_capacity(params.len());
                for (key, value) in params {
                    raw.entry(key).or_insert(value);
                }
                let output = app.query(&endpoint, &data, &raw).await?;
                println!("{}", output);
            }
            Some(Commands::Inspect { endpoint }) => {
                print!("{}", app.inspect(endpoint.as_deref())?);
            }
            None => print!("{}", app.inspect(None)?),
        }
        Ok(())
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            service: QueryBindService::new(Arc::new(config.schemas), Arc::new(config.bindings)),
        }
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Describe one endpoint, or all of them in registration order
    pub fn inspect(&self, endpoint: Option<&str>) -> Result<String> {
        let bindings = self.service.bindings();
        let mut out = String::new();

        match endpoint {
            Some(name) => {
                let config = bindings.get(name)?;
                self.describe(&mut out, name, config)?;
            }
            None if bindings.is_empty() => out.push_str("No endpoints bound\n"),
            None => {
                for (name, config) in bindings.iter() {
                    self.describe(&mut out, name, config)?;
                }
            }
        }
        Ok(out)
    }

    fn describe(&self, out: &mut String, endpoint: &str, config: &BindingConfig) -> Result<()> {
        let descriptors = self.service.schemas().discover(&config.entity)?;

        writeln!(out, "{} -> {}", endpoint, config.entity)?;
        writeln!(
            out,
            "  page size {} (max {}), sort {} {}",
            config.default_page_size,
            config.max_page_size,
            config.default_sort,
            config.default_direction
        )?;
        if !config.search_attributes.is_empty() {
            writeln!(out, "  search: {}", config.search_attributes.join(", "))?;
        }
        for descriptor in descriptors.iter() {
            writeln!(
                out,
                "  ?{} {} {} ({})",
                descriptor.param_name,
                descriptor.operator,
                descriptor.attribute_name,
                descriptor.value_type
            )?;
        }
        Ok(())
    }

    /// Execute an endpoint against rows loaded from a JSON array file
    pub async fn query(&self, endpoint: &str, data: &Path, params: &RawParams) -> Result<String> {
        let content = fs::read_to_string(data)
            .with_context(|| format!("Failed to read data file: {}", data.display()))?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file: {}", data.display()))?;

        let config = self.service.bindings().get(endpoint)?;
        let store = MemoryStore::new().with_rows(&config.entity, rows)?;

        let prepared = self.service.prepare(config, params)?;
        tracing::info!(query = %prepared, "Prepared query");

        let page = self.service.execute(config, params, &store).await?;
        tracing::info!(summary = %page, "Query executed");

        Ok(serde_json::to_string_pretty(&page)?)
    }
}
