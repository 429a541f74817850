//! # Error Types
//!
//! Custom error types for Telemetry Bridge using `thiserror`.
//!
//! Note that the calibration state machine itself has no error path:
//! invalid readings are suppressed and absence is surfaced as `None` from
//! `TelemetryStation::read`. These errors cover the ambient surfaces
//! (configuration, file logging).

use thiserror::Error;

/// Main error type for Telemetry Bridge
#[derive(Debug, Error)]
pub enum TelemetryBridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telemetry log errors
    #[error("Telemetry log error: {0}")]
    TelemetryLog(String),
}

/// Result type alias for Telemetry Bridge
pub type Result<T> = std::result::Result<T, TelemetryBridgeError>;
