//! # Telemetry Bridge Library
//!
//! Derive calibrated drone-state snapshots from navigation metadata embedded
//! in a live video stream.
//!
//! This library consumes decoded video frames carrying a raw navigation
//! sample, calibrates a takeoff-altitude reference while the aircraft is on
//! the ground, and publishes a time-bounded telemetry snapshot for
//! pull-based consumers.

pub mod config;
pub mod error;
pub mod frame;
pub mod session;
pub mod telemetry;
