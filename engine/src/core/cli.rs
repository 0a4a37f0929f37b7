use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::ENV_CONFIG;

#[derive(Parser)]
#[command(name = "querybind")]
#[command(version, about = "Declarative query binding engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

/// Parse a `key=value` request parameter
fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!(
            "Invalid parameter '{}'. Expected key=value, e.g. page=1",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List endpoint bindings and their filter parameters (default command)
    Inspect {
        /// Only show this endpoint
        endpoint: Option<String>,
    },
    /// Execute a binding against rows loaded from a JSON file
    Query {
        /// Endpoint name as declared in the config file
        endpoint: String,

        /// JSON array of rows for the endpoint's entity
        #[arg(long, short = 'd')]
        data: PathBuf,

        /// Request parameters as key=value pairs
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
}

impl Cli {
    fn split(self) -> (CliConfig, Option<Commands>) {
        (CliConfig { config: self.config }, self.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().split()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("status=active,pending"),
            Ok(("status".to_string(), "active,pending".to_string()))
        );
        assert_eq!(parse_param("search="), Ok(("search".to_string(), String::new())));
        assert_eq!(parse_param("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_param("page").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn test_query_command() {
        let cli = Cli::try_parse_from([
            "querybind",
            "query",
            "/users",
            "--data",
            "users.json",
            "page=1",
            "search=jo",
        ])
        .unwrap();
        let (config, command) = cli.split();

        assert!(config.config.is_none());
        match command {
            Some(Commands::Query {
                endpoint,
                data,
                params,
            }) => {
                assert_eq!(endpoint, "/users");
                assert_eq!(data, PathBuf::from("users.json"));
                assert_eq!(
                    params,
                    vec![
                        ("page".to_string(), "1".to_string()),
                        ("search".to_string(), "jo".to_string())
                    ]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["querybind", "inspect", "-c", "custom.json"]).unwrap();
        let (config, command) = cli.split();

        assert_eq!(config.config, Some(PathBuf::from("custom.json")));
        assert!(matches!(command, Some(Commands::Inspect { endpoint: None })));
    }

    #[test]
    fn test_query_requires_data() {
        assert!(Cli::try_parse_from(["querybind", "query", "/users"]).is_err());
    }
}
