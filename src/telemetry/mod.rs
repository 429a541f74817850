//! # Telemetry Module
//!
//! The telemetry-ingestion core: extraction, calibration, and staleness.
//!
//! This module handles:
//! - Extracting structured readings from raw navigation samples
//! - Calibrating a takeoff-altitude reference while on the ground
//! - Publishing timestamped snapshots with relative altitude
//! - Expiring stale snapshots after a fix dropout
//! - Logging published snapshots to rotating JSONL files

pub mod extractor;
pub mod logger;
pub mod station;
pub mod types;

pub use extractor::extract_reading;
pub use station::TelemetryStation;
pub use types::{CalibratedTelemetry, DatedValue, Quaternion, RawNavigationSample, TelemetryReading, Velocity};
