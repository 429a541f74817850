//! # Telemetry Types
//!
//! Data model for the telemetry-ingestion path: the raw per-frame
//! navigation sample, the extracted reading, and the published snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Attitude quaternion components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Identity rotation (no attitude change).
    #[must_use]
    pub fn identity() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

/// NED velocity in meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Velocity {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl Velocity {
    /// Zero velocity (stationary).
    #[must_use]
    pub fn zero() -> Self {
        Self { north: 0.0, east: 0.0, down: 0.0 }
    }
}

/// Raw navigation payload decoded from a single video frame.
///
/// Field layout mirrors the firmware metadata block: flat scalars, absolute
/// altitude, attitude quaternions for both the drone body and the camera
/// frame (gimbal), and NED speed components. Produced once per delivered
/// frame and not retained beyond extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawNavigationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Absolute altitude in meters (not yet relative to takeoff).
    pub altitude: f64,
    pub drone_quat_x: f64,
    pub drone_quat_y: f64,
    pub drone_quat_z: f64,
    pub drone_quat_w: f64,
    pub frame_quat_x: f64,
    pub frame_quat_y: f64,
    pub frame_quat_z: f64,
    pub frame_quat_w: f64,
    pub speed_north: f64,
    pub speed_east: f64,
    pub speed_down: f64,
}

/// Extracted, still-uncalibrated telemetry reading.
///
/// Ephemeral: consumed immediately by [`TelemetryStation::on_frame`].
///
/// [`TelemetryStation::on_frame`]: crate::telemetry::TelemetryStation::on_frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub latitude: f64,
    pub longitude: f64,
    /// Absolute altitude in meters.
    pub altitude: f64,
    pub drone_attitude: Quaternion,
    pub frame_attitude: Quaternion,
    pub velocity: Velocity,
}

/// Published, calibrated telemetry snapshot.
///
/// Invariant: `altitude` is always `raw altitude - takeoff_altitude` at the
/// time of computation, and `takeoff_altitude` only changes on a fresh
/// calibration event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibratedTelemetry {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters relative to the takeoff reference.
    pub altitude: f64,
    /// Absolute altitude reference captured while on the ground.
    pub takeoff_altitude: f64,
    pub drone_attitude: Quaternion,
    pub frame_attitude: Quaternion,
    pub velocity: Velocity,
}

/// A value paired with the wall-clock time it was produced.
///
/// Consumers must treat a snapshot older than the staleness threshold as
/// absent; staleness is a read-side predicate, not a background eviction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedValue<T> {
    pub value: T,
    pub date: DateTime<Utc>,
}

impl<T> DatedValue<T> {
    #[must_use]
    pub fn new(value: T, date: DateTime<Utc>) -> Self {
        Self { value, date }
    }
}
