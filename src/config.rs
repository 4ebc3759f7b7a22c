use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SquadError;
use crate::flags::RedFlagThresholds;
use crate::load::MetricsConfig;
use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Load window and readiness settings
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Red-flag thresholds
    #[serde(default)]
    pub red_flags: RedFlagThresholds,

    /// Logging output
    #[serde(default)]
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
pub struct AppSettings {
    /// Team name shown in report headers
    pub squad_name: String,

    /// Directory holding profiles.csv, wellness.csv and sessions.csv
    pub data_dir: PathBuf,

    /// Player reported on when none is given
    pub default_player_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings::default(),
            metrics: MetricsConfig::default(),
            red_flags: RedFlagThresholds::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            squad_name: "First Team".to_string(),
            data_dir: PathBuf::from("./data"),
            default_player_id: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".squadrs")
            .join("config.toml")
    }

    /// Load the default config file, or defaults when there is none
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(Self::default_config_path())
    }

    /// Defaults only when `path` does not exist; a broken file is an error
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            eprintln!("Config file not found, using defaults: {}", path.display());
            return Ok(Self::default());
        }

        Self::load_from_file(path)
    }

    /// Reject settings the calculators cannot work with
    pub fn validate(&self) -> std::result::Result<(), SquadError> {
        if self.metrics.window_days < 2 {
            return Err(SquadError::Configuration(format!(
                "metrics.window_days must be at least 2, got {}",
                self.metrics.window_days
            )));
        }

        if self.metrics.sleep_target_hours.is_nan() || self.metrics.sleep_target_hours <= 0.0 {
            return Err(SquadError::Configuration(format!(
                "metrics.sleep_target_hours must be positive, got {}",
                self.metrics.sleep_target_hours
            )));
        }

        let t = &self.red_flags;
        if t.load_spike_ratio <= 1.0 || t.load_spike_critical_ratio < t.load_spike_ratio {
            return Err(SquadError::Configuration(
                "red_flags.load_spike_ratio must be above 1 and not above the critical ratio"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
