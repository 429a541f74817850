//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Video stream configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    /// Camera-native frame rate the source delivers at.
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: u32,

    /// Maximum snapshot age tolerated across a fix dropout.
    #[serde(default = "default_staleness_timeout_ms")]
    pub staleness_timeout_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: default_frame_rate_hz(),
            staleness_timeout_ms: default_staleness_timeout_ms(),
        }
    }
}

/// Telemetry logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_frame_rate_hz() -> u32 { 30 }
fn default_staleness_timeout_ms() -> u64 { 1000 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }
fn default_log_format() -> String { "jsonl".to_string() }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use telemetry_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Common camera frame rates; the staleness window assumes frames
        // arrive at least a few times per second.
        if self.stream.frame_rate_hz == 0 || self.stream.frame_rate_hz > 240 {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("frame_rate_hz must be between 1 and 240")
            ));
        }

        if self.stream.staleness_timeout_ms == 0 || self.stream.staleness_timeout_ms > 60000 {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("staleness_timeout_ms must be between 1 and 60000")
            ));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("telemetry log_dir cannot be empty when enabled")
            ));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("log_interval_ms must be between 1 and 60000")
            ));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        if self.telemetry.format != "jsonl" {
            return Err(crate::error::TelemetryBridgeError::Config(
                toml::de::Error::custom("log format must be 'jsonl' (only supported format)")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stream.frame_rate_hz, 30);
        assert_eq!(config.stream.staleness_timeout_ms, 1000);
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.format, "jsonl");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.stream.frame_rate_hz, default_frame_rate_hz());
        assert_eq!(config.telemetry.log_dir, default_log_dir());
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let config: Config = toml::from_str(
            r#"
            [stream]
            frame_rate_hz = 60

            [telemetry]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.stream.frame_rate_hz, 60);
        assert_eq!(config.stream.staleness_timeout_ms, 1000);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.max_files_to_keep, 10);
    }

    #[test]
    fn test_validate_rejects_zero_frame_rate() {
        let mut config = Config::default();
        config.stream.frame_rate_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_staleness_timeout() {
        let mut config = Config::default();
        config.stream.staleness_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());

        // Disabled telemetry does not care about the directory.
        config.telemetry.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.telemetry.format = "csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [stream]
            frame_rate_hz = 24
            staleness_timeout_ms = 2000
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.stream.frame_rate_hz, 24);
        assert_eq!(config.stream.staleness_timeout_ms, 2000);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/telemetry-bridge.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [telemetry]
            max_records_per_file = 0
            "#
        )
        .unwrap();

        assert!(Config::load(file.path()).is_err());
    }
}
