//! Configuration management for Chargeguard
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{ChargeGuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Decision engine policy
    pub resolver: ResolverConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Tick interval in milliseconds
    pub poll_interval_ms: u64,

    /// Timezone used to derive the hour of day
    pub timezone: String,
}

/// Decision engine policy, supplied once per engine instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Raw charger statuses per abstract state
    pub translation: TranslationConfig,

    /// Hours of day (0-23) during which charging must not proceed
    #[serde(default)]
    pub non_hours: Vec<u8>,

    /// Seconds without activity before a connected, idle car counts as done
    #[serde(default = "defaults::done_timeout_seconds")]
    pub done_timeout_seconds: u64,
}

/// Raw charger status strings per translated state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub idle: Vec<String>,
    pub connected: Vec<String>,
    pub charging: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level; falls back to `level`
    pub console_level: Option<String>,

    /// Optional file-specific level; falls back to `level`
    pub file_level: Option<String>,

    /// Log file path or directory
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "chargeguard_config.yaml",
            "/data/chargeguard_config.yaml",
            "/etc/chargeguard/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.resolver.validate()?;

        if self.poll_interval_ms == 0 {
            return Err(ChargeGuardError::validation(
                "poll_interval_ms",
                "Must be greater than 0",
            ));
        }

        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ChargeGuardError::validation(
                "timezone",
                "Unknown IANA timezone",
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)?;
        Ok(())
    }
}

impl ResolverConfig {
    /// Validate the engine policy without building an engine
    pub fn validate(&self) -> Result<()> {
        let lists = [
            ("resolver.translation.idle", &self.translation.idle),
            ("resolver.translation.connected", &self.translation.connected),
            ("resolver.translation.charging", &self.translation.charging),
        ];
        for (field, list) in lists {
            if list.is_empty() {
                return Err(ChargeGuardError::config(format!(
                    "{} must list at least one raw status",
                    field
                )));
            }
        }

        if let Some(hour) = self.non_hours.iter().find(|h| **h > 23) {
            let message = format!("Hour {} is outside 0-23", hour);
            return Err(ChargeGuardError::validation(
                "resolver.non_hours",
                message.as_str(),
            ));
        }

        if self.done_timeout_seconds == 0 {
            return Err(ChargeGuardError::validation(
                "resolver.done_timeout_seconds",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}
