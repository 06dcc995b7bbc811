use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{LogConfig, LogFormat, LogLevel};
use crate::models::MAX_WINDOW_DAYS;
use crate::readiness::{Factor, ReadinessConfig};
use crate::trend::TrendConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Readiness scoring weights and constants
    pub readiness: ReadinessConfig,

    /// Trend window settings
    pub trend: TrendConfig,

    /// Logging output
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// SQLite file holding daily records
    pub database_path: PathBuf,

    /// Directory `export` writes to when no output path is given
    pub export_dir: PathBuf,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();

        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            database_path: AppConfig::data_dir().join("readyrs.db"),
            export_dir: PathBuf::from("./exports"),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Per-user data directory (`~/.readyrs`)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".readyrs")
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when the file does not exist. A file that exists but fails to parse or
    /// validate is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check the scoring and trend sections
    pub fn validate(&self) -> Result<()> {
        self.readiness
            .validate()
            .context("Invalid readiness configuration")?;

        if self.trend.window_days == 0 || self.trend.window_days > MAX_WINDOW_DAYS {
            anyhow::bail!(
                "trend.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS,
                self.trend.window_days
            );
        }

        Ok(())
    }

    /// Settable keys, in listing order
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = Factor::ALL
            .iter()
            .map(|f| format!("readiness.weights.{}", f.key()))
            .collect();

        keys.extend(
            [
                "readiness.rhr_baseline",
                "readiness.hrv_neutral_score",
                "readiness.acwr_optimal_low",
                "readiness.acwr_optimal_high",
                "readiness.acwr_decay_span",
                "trend.window_days",
                "settings.database_path",
                "settings.export_dir",
                "logging.level",
                "logging.format",
            ]
            .iter()
            .map(|k| k.to_string()),
        );

        keys
    }

    /// Read a single value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        if let Some(factor) = Self::weight_key(key) {
            return Ok(self.readiness.weights.weight(factor).to_string());
        }

        let value = match key {
            "readiness.rhr_baseline" => self.readiness.rhr_baseline.to_string(),
            "readiness.hrv_neutral_score" => self.readiness.hrv_neutral_score.to_string(),
            "readiness.acwr_optimal_low" => self.readiness.acwr_optimal_low.to_string(),
            "readiness.acwr_optimal_high" => self.readiness.acwr_optimal_high.to_string(),
            "readiness.acwr_decay_span" => self.readiness.acwr_decay_span.to_string(),
            "trend.window_days" => self.trend.window_days.to_string(),
            "settings.database_path" => self.settings.database_path.display().to_string(),
            "settings.export_dir" => self.settings.export_dir.display().to_string(),
            "logging.level" => self.logging.level.to_filter(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        };

        Ok(value)
    }

    /// Update a single value by dotted key. The result is validated before
    /// it is kept; an invalid update leaves the configuration unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();

        if let Some(factor) = Self::weight_key(key) {
            updated.readiness.weights.set_weight(factor, parse_number(key, value)?);
        } else {
            match key {
                "readiness.rhr_baseline" => updated.readiness.rhr_baseline = parse_number(key, value)?,
                "readiness.hrv_neutral_score" => {
                    updated.readiness.hrv_neutral_score = parse_number(key, value)?
                }
                "readiness.acwr_optimal_low" => updated.readiness.acwr_optimal_low = parse_number(key, value)?,
                "readiness.acwr_optimal_high" => {
                    updated.readiness.acwr_optimal_high = parse_number(key, value)?
                }
                "readiness.acwr_decay_span" => updated.readiness.acwr_decay_span = parse_number(key, value)?,
                "trend.window_days" => {
                    updated.trend.window_days = value
                        .trim()
                        .parse()
                        .with_context(|| format!("{} expects a whole number of days, got '{}'", key, value))?
                }
                "settings.database_path" => updated.settings.database_path = PathBuf::from(value),
                "settings.export_dir" => updated.settings.export_dir = PathBuf::from(value),
                "logging.level" => {
                    updated.logging.level = value.parse::<LogLevel>().map_err(anyhow::Error::msg)?
                }
                "logging.format" => {
                    updated.logging.format = value.parse::<LogFormat>().map_err(anyhow::Error::msg)?
                }
                _ => anyhow::bail!("Unknown configuration key: {}", key),
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every key with its current value
    pub fn list(&self) -> Vec<(String, String)> {
        Self::keys()
            .into_iter()
            .filter_map(|key| self.get(&key).ok().map(|value| (key, value)))
            .collect()
    }

    fn weight_key(key: &str) -> Option<Factor> {
        let name = key.strip_prefix("readiness.weights.")?;
        Factor::ALL.into_iter().find(|f| f.key() == name)
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("{} expects a number, got '{}'", key, value))
}
