//! # Telemetry Station
//!
//! The calibration and staleness state machine at the heart of the bridge.
//!
//! The station owns the "current telemetry" snapshot. It filters invalid
//! readings, establishes (and re-establishes) the takeoff-altitude
//! reference, computes relative altitude, and expires the snapshot after a
//! fix dropout longer than the staleness threshold.
//!
//! Conceptual states: `Idle` (no stream) -> `Calibrating` (streaming,
//! reference absent or re-tracking while not flying) -> `Tracking`
//! (streaming, flying, reference locked) -> `Gap` (last snapshot aging
//! within the grace window) -> back to `Tracking` on the next valid frame,
//! or to "no snapshot" once the gap exceeds the threshold.
//! [`TelemetryStation::on_stream_stopped`] forces `Idle` from any state.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use super::types::{CalibratedTelemetry, DatedValue, TelemetryReading};

/// Default snapshot staleness threshold in milliseconds.
pub const DEFAULT_STALENESS_TIMEOUT_MS: i64 = 1000;

/// Mutable state owned exclusively by the station.
///
/// Both fields live and die with the telemetry session: created on stream
/// start, updated per valid frame, cleared on stream stop.
#[derive(Debug, Default)]
struct StationState {
    /// Absolute altitude reference; `None` means "not yet calibrated".
    takeoff_altitude: Option<f64>,
    /// Latest published snapshot, if any.
    snapshot: Option<DatedValue<CalibratedTelemetry>>,
}

/// Calibration & staleness state machine for stream-embedded telemetry.
///
/// Frames arrive sequentially from a single delivery context; consumers may
/// read concurrently from another context (a UI refresh timer, a guidance
/// loop). The interior mutex guarantees a reader always observes a
/// complete, consistently computed [`CalibratedTelemetry`], never a
/// partially updated one.
///
/// No operation blocks beyond the mutex hand-off, and nothing here awaits a
/// timer: the staleness threshold is evaluated against the `now` passed to
/// [`TelemetryStation::on_frame`].
#[derive(Debug)]
pub struct TelemetryStation {
    state: Mutex<StationState>,
    staleness_timeout: Duration,
}

impl Default for TelemetryStation {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStation {
    /// Creates a station with the default 1-second staleness threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_staleness_timeout(Duration::milliseconds(DEFAULT_STALENESS_TIMEOUT_MS))
    }

    /// Creates a station with a custom staleness threshold.
    ///
    /// # Arguments
    ///
    /// * `staleness_timeout` - Maximum snapshot age tolerated across a fix
    ///   dropout before the snapshot is dropped
    #[must_use]
    pub fn with_staleness_timeout(staleness_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(StationState::default()),
            staleness_timeout,
        }
    }

    /// Handles a stream (re)start.
    ///
    /// Clears the takeoff-altitude reference and the stored snapshot. Must
    /// be called once per stream instance before any frame is processed for
    /// that stream.
    pub fn on_stream_started(&self) {
        let mut state = self.lock();
        state.takeoff_altitude = None;
        state.snapshot = None;
        debug!("Stream started, calibration state cleared");
    }

    /// Handles a stream stop. Idempotent.
    ///
    /// The snapshot becomes unavailable to readers and the calibration
    /// reference is discarded.
    pub fn on_stream_stopped(&self) {
        let mut state = self.lock();
        state.takeoff_altitude = None;
        state.snapshot = None;
        debug!("Stream stopped, telemetry unavailable");
    }

    /// Processes one extracted reading from the frame-delivery path.
    ///
    /// A reading is invalid if its latitude, longitude, or altitude is NaN,
    /// or if latitude and longitude are both exactly zero (the "no fix"
    /// sentinel). Invalid readings never update the snapshot; they only
    /// drop it once its age against `now` exceeds the staleness threshold,
    /// so short fix gaps are tolerated.
    ///
    /// On a valid reading the takeoff reference re-tracks ground level
    /// whenever the aircraft is not airborne (and on the first valid frame
    /// after a stream start), then a snapshot with altitude relative to
    /// that reference is published, replacing any prior one.
    ///
    /// # Arguments
    ///
    /// * `reading` - Extracted telemetry reading for this frame
    /// * `now` - Wall-clock time of frame delivery
    /// * `is_flying` - Current flight state reported by the session
    pub fn on_frame(&self, reading: TelemetryReading, now: DateTime<Utc>, is_flying: bool) {
        let mut state = self.lock();

        if !is_reading_valid(&reading) {
            if let Some(snapshot) = &state.snapshot {
                if now - snapshot.date > self.staleness_timeout {
                    debug!("Dropping stale telemetry snapshot after fix dropout");
                    state.snapshot = None;
                }
            }
            return;
        }

        // The reference re-tracks ground level on every frame while the
        // aircraft is not airborne and locks the instant it starts flying.
        if !is_flying {
            state.takeoff_altitude = Some(reading.altitude);
        }
        let takeoff_altitude = *state.takeoff_altitude.get_or_insert(reading.altitude);

        let telemetry = CalibratedTelemetry {
            latitude: reading.latitude,
            longitude: reading.longitude,
            altitude: reading.altitude - takeoff_altitude,
            takeoff_altitude,
            drone_attitude: reading.drone_attitude,
            frame_attitude: reading.frame_attitude,
            velocity: reading.velocity,
        };

        trace!(
            altitude = telemetry.altitude,
            takeoff_altitude = telemetry.takeoff_altitude,
            "Published telemetry snapshot"
        );
        state.snapshot = Some(DatedValue::new(telemetry, now));
    }

    /// Returns the stored snapshot's value, or `None` if no snapshot is
    /// stored.
    ///
    /// Safe to call at any time, including before any stream has started.
    /// Staleness is enforced proactively on the invalid-reading branch of
    /// [`TelemetryStation::on_frame`]; a valid-reading stream never goes
    /// unread-stale because every valid frame refreshes the timestamp.
    #[must_use]
    pub fn read(&self) -> Option<CalibratedTelemetry> {
        self.lock().snapshot.map(|snapshot| snapshot.value)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StationState> {
        // A poisoned mutex can only come from a panic in one of the short
        // critical sections above; the state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Validity predicate for an extracted reading.
///
/// Latitude/longitude both zero is the firmware sentinel for "no fix".
fn is_reading_valid(reading: &TelemetryReading) -> bool {
    !(reading.latitude.is_nan()
        || reading.longitude.is_nan()
        || reading.altitude.is_nan()
        || (reading.latitude == 0.0 && reading.longitude == 0.0))
}
