//! Configuration for the tablesplit CLI
//!
//! Settings live in `<home>/tablesplit.toml`, where home is
//! `$TABLESPLIT_HOME` or `~/.tablesplit`. A missing file means defaults.
//! Command-line flags override file values.
//!
//! ```toml
//! [compose]
//! naming = "upper_snake"
//! sibling_chaining = false
//!
//! [logging]
//! log_to_file = true
//! directory = "/var/log/tablesplit"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tablesplit_logging::{logs_dir, tablesplit_home};
use tablesplit_schema::ComposeOptions;

pub const CONFIG_FILE_NAME: &str = "tablesplit.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub compose: ComposeOptions,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Also write a daily rolling log file
    pub log_to_file: bool,
    /// Defaults to `<home>/logs`
    pub directory: Option<PathBuf>,
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&source)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Directory for the file log, when file logging is on
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .log_to_file
            .then(|| self.logging.directory.clone().unwrap_or_else(logs_dir))
    }
}

/// Get the config file path: <home>/tablesplit.toml
pub fn config_path() -> PathBuf {
    tablesplit_home().join(CONFIG_FILE_NAME)
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show effective settings in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows paths and effective settings
pub fn run(args: ConfigArgs, config: &CliConfig) -> Result<()> {
    let home = tablesplit_home();
    let path = config_path();
    let log_dir = config.log_dir();

    if args.json {
        let value = serde_json::json!({
            "home": home.to_string_lossy(),
            "config_file": {
                "path": path.to_string_lossy(),
                "exists": path.exists(),
            },
            "compose": {
                "naming": config.compose.naming.as_str(),
                "sibling_chaining": config.compose.sibling_chaining,
            },
            "logging": {
                "log_to_file": config.logging.log_to_file,
                "directory": log_dir.as_ref().map(|d| d.to_string_lossy()),
            },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("TABLESPLIT CONFIGURATION");
    println!();
    println!("Home:              {}", home.display());
    println!(
        "Config file:       {} ({})",
        path.display(),
        if path.exists() { "found" } else { "not found, using defaults" }
    );
    println!();
    println!("Naming:            {}", config.compose.naming);
    println!("Sibling chaining:  {}", config.compose.sibling_chaining);
    match log_dir {
        Some(dir) => println!("Log directory:     {}", dir.display()),
        None => println!("Log directory:     (file logging off)"),
    }
    Ok(())
}
