//! Configuration for Meridian
//!
//! Paths resolve under `$MERIDIAN_HOME` (default `~/.meridian`). Settings
//! come from an optional `config.toml` there; command-line flags override
//! them.

use meridian_types::paths::{config_path, meridian_home};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub check: CheckSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSettings {
    /// Report undeclared members as errors
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// tracing filter used when RUST_LOG is unset
    #[serde(default)]
    pub filter: Option<String>,

    /// Write the rolling log file
    #[serde(default = "default_file_logging")]
    pub file: bool,
}

fn default_file_logging() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: None,
            file: default_file_logging(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the home directory, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved paths and settings in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows current paths and settings
pub fn run(args: ConfigArgs, config: &Config) -> anyhow::Result<()> {
    let home = meridian_home();
    let config_file = config_path();
    let logs = meridian_logging::logs_dir();
    let filter = config
        .logging
        .filter
        .as_deref()
        .unwrap_or(meridian_logging::DEFAULT_LOG_FILTER);

    if args.json {
        let output = serde_json::json!({
            "home": home.to_string_lossy(),
            "config": {
                "path": config_file.to_string_lossy(),
                "exists": config_file.exists(),
            },
            "logs": {
                "path": logs.to_string_lossy(),
                "exists": logs.exists(),
            },
            "check": {
                "strict": config.check.strict,
            },
            "logging": {
                "filter": filter,
                "file": config.logging.file,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("MERIDIAN CONFIGURATION");
        println!("======================");
        println!();
        println!("Home:     {}", home.display());
        println!(
            "Config:   {} ({})",
            config_file.display(),
            if config_file.exists() { "exists" } else { "not found, using defaults" }
        );
        println!("Logs:     {}", logs.display());
        println!();
        println!("Check:    strict = {}", config.check.strict);
        println!("Logging:  filter = {}", filter);
        println!("          file = {}", config.logging.file);
    }

    Ok(())
}
