//! Runtime configuration
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. Environment variables (THENABLE_MAX_TURNS, THENABLE_LOG)
//! 2. Configuration file (thenable.toml)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use thenable::util::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_toml_str("[event_loop]\nmax_turns = 500\n").unwrap();
//! assert_eq!(config.event_loop.max_turns, Some(500));
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::util::logger::LogLevel;

/// Environment variable overriding `event_loop.max_turns` ("none" disables the limit).
pub const ENV_MAX_TURNS: &str = "THENABLE_MAX_TURNS";
/// Environment variable overriding `log.level`.
pub const ENV_LOG: &str = "THENABLE_LOG";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Event loop settings
    #[serde(default)]
    pub event_loop: EventLoopConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Event loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventLoopConfig {
    /// Maximum turns a single `run` may execute; `None` is unbounded.
    #[serde(default = "default_max_turns")]
    pub max_turns: Option<usize>,
    /// Emit a debug event for every turn
    #[serde(default)]
    pub trace_turns: bool,
}

fn default_max_turns() -> Option<usize> {
    Some(1_000_000)
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            trace_turns: false,
        }
    }
}

impl EventLoopConfig {
    /// Configuration without a turn limit.
    pub fn unbounded() -> Self {
        Self {
            max_turns: None,
            ..Self::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// One of "trace", "debug", "info", "warn" (or "warning"), "error"; case-insensitive
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl LogConfig {
    /// Parse the configured level.
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse()
    }
}

impl RuntimeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.log.log_level()?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides read through `lookup` (normally the process environment).
    pub fn with_overrides<F>(
        mut self,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_TURNS) {
            self.event_loop.max_turns = parse_max_turns(&raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG) {
            raw.parse::<LogLevel>()?;
            self.log.level = raw.trim().to_ascii_lowercase();
        }
        Ok(self)
    }

    /// Defaults with environment overrides; invalid overrides are logged and
    /// skipped.
    pub fn from_env() -> Self {
        let lookup = |key: &str| std::env::var(key).ok();
        match RuntimeConfig::default().with_overrides(lookup) {
            Ok(config) => config,
            Err(err) => {
                warn!("ignoring environment configuration: {}", err);
                RuntimeConfig::default()
            }
        }
    }
}

fn parse_max_turns(raw: &str) -> Result<Option<usize>, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse::<usize>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            key: ENV_MAX_TURNS,
            value: raw.to_string(),
        })
}

/// Load configuration from a TOML file, then apply environment overrides.
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        RuntimeConfig::from_toml_str(&content)?
    } else {
        RuntimeConfig::default()
    };
    config.with_overrides(|key| std::env::var(key).ok())
}

/// Save configuration as TOML.
pub fn save_config(
    config: &RuntimeConfig,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(path, config.to_toml_string()?)?;
    Ok(())
}

static GLOBAL: Lazy<RuntimeConfig> = Lazy::new(RuntimeConfig::from_env);

/// Process-wide configuration, read from the environment once.
pub fn global() -> &'static RuntimeConfig {
    &GLOBAL
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unknown log level: {0:?}")]
    UnknownLogLevel(String),
}

#[cfg(test)]
mod tests;
