//! Configuration management for Time it

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cycle::{StartPolicy, MAX_MINUTES, MIN_MINUTES};
use crate::error::{ConfigError, Result};
use crate::logging::LogFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Duration offered when the user does not pick one
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default)]
    pub on_start_while_active: StartPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Period of the host's tick driver
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_minutes() -> u32 {
    5
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            on_start_while_active: StartPolicy::default(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load from the default location, falling back to defaults when no file exists
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            cycle: CycleConfig::default(),
            timer: TimerConfig::default(),
            logging: LogConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&self.cycle.default_minutes) {
            return Err(ConfigError::InvalidValue {
                field: "cycle.default_minutes".to_string(),
                reason: format!(
                    "must be between {} and {} (got {})",
                    MIN_MINUTES, MAX_MINUTES, self.cycle.default_minutes
                ),
            }
            .into());
        }

        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timer.tick_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if let Err(reason) = self.logging.format.parse::<LogFormat>() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                reason,
            }
            .into());
        }

        Ok(())
    }
}

/// Resolve the configuration file path following XDG Base Directory conventions
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TIMEIT_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

    Ok(config_dir.join("timeit").join("config.toml"))
}
