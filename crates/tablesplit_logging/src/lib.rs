//! Shared logging utilities for tablesplit binaries.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "tablesplit=info,tablesplit_schema=info,tablesplit_grouping=info";

/// Environment variable overriding the tablesplit home directory.
pub const HOME_ENV: &str = "TABLESPLIT_HOME";

const HOME_DIR_NAME: &str = ".tablesplit";

/// Logging configuration shared by tablesplit binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Write a daily rolling log file here when set
    pub log_dir: Option<PathBuf>,
}

/// Initialize tracing with stderr output and an optional daily file writer.
///
/// Stderr only shows warnings unless `verbose` is set; the file always
/// follows `RUST_LOG` (or [`DEFAULT_LOG_FILTER`]). Keep the returned guard
/// alive for the life of the process or buffered file lines are lost.
pub fn init_logging(config: LogConfig<'_>) -> Result<Option<WorkerGuard>> {
    let mut guard = None;
    let file_layer = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
            let file_name = format!("{}.log", sanitize_name(config.app_name));
            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(env_filter()),
            )
        }
        None => None,
    };

    let console_filter = if config.verbose {
        env_filter()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Get the tablesplit home directory: `$TABLESPLIT_HOME`, else `~/.tablesplit`
pub fn tablesplit_home() -> PathBuf {
    resolve_home(std::env::var_os(HOME_ENV), dirs::home_dir())
}

/// Get the logs directory: `<home>/logs`
pub fn logs_dir() -> PathBuf {
    tablesplit_home().join("logs")
}

fn resolve_home(override_path: Option<OsString>, user_home: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    match user_home {
        Some(home) => home.join(HOME_DIR_NAME),
        None => PathBuf::from(".").join(HOME_DIR_NAME),
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}
