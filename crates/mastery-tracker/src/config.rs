use anyhow::{Context, Result};
use mastery_common::config::{GeneralConfig, ProgressConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::progress::MAX_WINDOW_DAYS;

const APP_DIR: &str = "self-mastery";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TrackerConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join(APP_DIR);

        Self { path: data_dir.join("mastery.db").to_string_lossy().to_string() }
    }
}

impl TrackerConfig {
    /// Default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join(APP_DIR).join("tracker.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        debug!("Loading tracker configuration from {:?}", config_path);

        if !config_path.exists() {
            info!(
                "Configuration file not found at {:?}, creating default configuration",
                config_path
            );
            let default_config = Self::default();
            default_config.save_to_path(config_path)?;
            return Ok(default_config);
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: TrackerConfig = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        info!("Loaded tracker configuration from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        debug!("Saving tracker configuration to {:?}", config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Saved tracker configuration to {:?}", config_path);
        Ok(())
    }

    /// Validate the configuration settings
    pub fn validate(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create database directory: {:?}", parent))?;
        }

        let threshold = self.progress.streak_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("streak_threshold must be between 0 and 1, got {}", threshold);
        }

        let windows = [
            ("ranking_window_days", self.progress.ranking_window_days),
            ("trend_window_days", self.progress.trend_window_days),
        ];
        for (name, days) in windows {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                anyhow::bail!("{} must be between 1 and {}, got {}", name, MAX_WINDOW_DAYS, days);
            }
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}
