//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation of pricing assumptions

use crate::defaults::DEFAULT_TARGET_UTILIZATION;
use crate::models::{CostOptions, ReadConsistency};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Pricing assumptions applied to every estimate
    pub estimate: EstimateConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub read_target_utilization: f64,
    pub write_target_utilization: f64,
    pub point_in_time_recovery: bool,
    pub read_consistency: ReadConsistency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
    /// Regions pricing dataset; the built-in catalog is used when unset
    pub pricing_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "ERROR".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            read_target_utilization: DEFAULT_TARGET_UTILIZATION,
            write_target_utilization: DEFAULT_TARGET_UTILIZATION,
            point_in_time_recovery: true,
            read_consistency: ReadConsistency::Strong,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("logs"),
            pricing_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("keyspaces-estimate.toml"),
            PathBuf::from(".keyspaces-estimate.toml"),
            dirs::config_dir()
                .map(|d| d.join("keyspaces-estimate").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("KEYSPACES_ESTIMATE_TARGET_UTILIZATION") {
            let utilization: f64 = val
                .parse()
                .context("Invalid KEYSPACES_ESTIMATE_TARGET_UTILIZATION")?;
            self.estimate.read_target_utilization = utilization;
            self.estimate.write_target_utilization = utilization;
        }
        if let Ok(val) = env::var("KEYSPACES_ESTIMATE_PITR") {
            self.estimate.point_in_time_recovery =
                val.parse().context("Invalid KEYSPACES_ESTIMATE_PITR")?;
        }
        if let Ok(val) = env::var("KEYSPACES_ESTIMATE_CONSISTENCY") {
            self.estimate.read_consistency = val
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid KEYSPACES_ESTIMATE_CONSISTENCY")?;
        }

        if let Ok(val) = env::var("KEYSPACES_ESTIMATE_PRICING_FILE") {
            self.paths.pricing_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("KEYSPACES_ESTIMATE_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("read_target_utilization", self.estimate.read_target_utilization),
            ("write_target_utilization", self.estimate.write_target_utilization),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(anyhow::anyhow!(
                    "{} must be greater than 0 and at most 1, got {}",
                    name,
                    value
                ));
            }
            if value < 0.5 {
                warn!(
                    setting = name,
                    value, "Target utilization is very low, provisioned costs will be inflated"
                );
            }
        }

        Ok(())
    }

    /// Pricing options derived from the `estimate` section
    pub fn cost_options(&self) -> CostOptions {
        CostOptions {
            point_in_time_recovery: self.estimate.point_in_time_recovery,
            read_target_utilization: self.estimate.read_target_utilization,
            write_target_utilization: self.estimate.write_target_utilization,
            read_consistency: self.estimate.read_consistency,
        }
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
///
/// A configuration that fails to load or validate is reported on stderr and
/// replaced by the defaults.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: {:#}. Using default configuration.", e);
            Config::default()
        })
    })
}
