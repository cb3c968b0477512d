//! # Configuration Module
//!
//! Process settings read from the environment (after `.env` is loaded),
//! plus tracing subscriber setup driven by those settings.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

// Defaults
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MENU_COLUMNS: usize = 2;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging verbosity and format
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Connection settings for the response store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound on every store call
    pub operation_timeout: Duration,
}

/// Settings for the Telegram bot process
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub telegram_token: String,
    pub store: StoreConfig,
    /// Buttons per keyboard row
    pub menu_columns: usize,
    pub log: LogConfig,
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

impl LogConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let level = lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be 'text' or 'json', got {other:?}"),
        };
        Ok(Self { level, format })
    }
}

impl StoreConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let timeout_secs = parse_or(&lookup, "STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            bail!("STORE_TIMEOUT_SECS must be at least 1");
        }
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            database_url,
            max_connections,
            operation_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Read from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl BotConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = lookup("TELEGRAM_BOT_TOKEN")
            .or_else(|| lookup("TELEGRAM_API_TOKEN"))
            .context("TELEGRAM_BOT_TOKEN must be set")?;
        let menu_columns = parse_or(&lookup, "MENU_COLUMNS", DEFAULT_MENU_COLUMNS)?;
        if menu_columns == 0 {
            bail!("MENU_COLUMNS must be at least 1");
        }

        Ok(Self {
            telegram_token,
            store: StoreConfig::from_lookup(&lookup)?,
            menu_columns,
            log: LogConfig::from_lookup(&lookup)?,
        })
    }

    /// Read from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    match log.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
