//! # Session Module
//!
//! Ports between the drone session and the telemetry core.
//!
//! The frame source and the session lifecycle adapter are modeled as
//! channels the ingest loop consumes, not base types the core inherits
//! from. The continuously updated flight state is a shared signal polled on
//! the frame path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, trace};

use crate::frame::VideoFrame;
use crate::telemetry::{extract_reading, TelemetryStation};

/// Lifecycle events emitted by the session adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The video stream (re)started; calibration state must be cleared
    /// before any frame of the new stream is processed.
    StreamStarted,
    /// The video stream stopped; telemetry becomes unavailable.
    StreamStopped,
}

/// Cloneable flight-state signal shared between the session adapter and the
/// frame path.
///
/// The session adapter sets it from flight-state changes; the ingest loop
/// polls it per frame.
#[derive(Debug, Clone, Default)]
pub struct FlightStateSignal {
    flying: Arc<AtomicBool>,
}

impl FlightStateSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the aircraft is currently reported airborne.
    #[must_use]
    pub fn is_flying(&self) -> bool {
        self.flying.load(Ordering::Relaxed)
    }

    /// Updates the flight state. Called by the session adapter.
    pub fn set_flying(&self, flying: bool) {
        self.flying.store(flying, Ordering::Relaxed);
    }
}

/// Channel-driven ingest loop feeding the telemetry station.
///
/// Owns nothing but references: the station is shared with whichever
/// consumer reads snapshots, the flight-state signal with the session
/// adapter.
#[derive(Debug)]
pub struct StreamIngest {
    station: Arc<TelemetryStation>,
    flight_state: FlightStateSignal,
}

impl StreamIngest {
    #[must_use]
    pub fn new(station: Arc<TelemetryStation>, flight_state: FlightStateSignal) -> Self {
        Self { station, flight_state }
    }

    /// Consumes frames and session events until the frame channel closes.
    ///
    /// Frames carry their own delivery order; events and frames arrive on
    /// separate channels, so the session adapter must stop the frame feed
    /// before signalling [`SessionEvent::StreamStopped`] if strict ordering
    /// matters to it.
    pub async fn run(
        &self,
        mut frames: mpsc::Receiver<VideoFrame>,
        mut events: mpsc::Receiver<SessionEvent>,
    ) {
        loop {
            tokio::select! {
                Some(event) = events.recv() => self.handle_event(event),
                frame = frames.recv() => match frame {
                    Some(frame) => self.handle_frame(&frame),
                    None => break,
                },
            }
        }
        info!("Telemetry ingest loop finished");
    }

    /// Applies one lifecycle event to the station.
    pub fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::StreamStarted => self.station.on_stream_started(),
            SessionEvent::StreamStopped => self.station.on_stream_stopped(),
        }
    }

    /// Feeds one frame to the station; frames without a usable navigation
    /// payload are skipped without touching the station.
    pub fn handle_frame(&self, frame: &VideoFrame) {
        match frame.nav_sample() {
            Some(sample) => {
                let reading = extract_reading(&sample);
                self.station.on_frame(reading, Utc::now(), self.flight_state.is_flying());
            }
            None => {
                trace!(pts_us = frame.pts_us, "Frame without navigation payload skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_nav_metadata;
    use crate::telemetry::RawNavigationSample;

    fn nav_frame(pts_us: u64, latitude: f64, longitude: f64, altitude: f64) -> VideoFrame {
        let sample = RawNavigationSample {
            latitude,
            longitude,
            altitude,
            drone_quat_x: 0.0,
            drone_quat_y: 0.0,
            drone_quat_z: 0.0,
            drone_quat_w: 1.0,
            frame_quat_x: 0.0,
            frame_quat_y: 0.0,
            frame_quat_z: 0.0,
            frame_quat_w: 1.0,
            speed_north: 0.0,
            speed_east: 0.0,
            speed_down: 0.0,
        };
        VideoFrame::with_nav_metadata(pts_us, 1280, 720, encode_nav_metadata(&sample))
    }

    fn ingest() -> (StreamIngest, Arc<TelemetryStation>, FlightStateSignal) {
        let station = Arc::new(TelemetryStation::new());
        let flight_state = FlightStateSignal::new();
        let ingest = StreamIngest::new(Arc::clone(&station), flight_state.clone());
        (ingest, station, flight_state)
    }

    #[test]
    fn test_flight_state_signal_is_shared() {
        let signal = FlightStateSignal::new();
        let clone = signal.clone();

        assert!(!signal.is_flying());
        clone.set_flying(true);
        assert!(signal.is_flying());
    }

    #[test]
    fn test_frame_without_payload_is_skipped() {
        let (ingest, station, _) = ingest();
        ingest.handle_event(SessionEvent::StreamStarted);

        ingest.handle_frame(&VideoFrame::bare(0, 1280, 720));
        assert!(station.read().is_none());
    }

    #[test]
    fn test_frame_with_payload_publishes_snapshot() {
        let (ingest, station, _) = ingest();
        ingest.handle_event(SessionEvent::StreamStarted);

        ingest.handle_frame(&nav_frame(0, 37.0, -122.0, 12.0));

        let snapshot = station.read().unwrap();
        assert_eq!(snapshot.latitude, 37.0);
        assert_eq!(snapshot.takeoff_altitude, 12.0);
        assert_eq!(snapshot.altitude, 0.0);
    }

    #[test]
    fn test_flight_state_is_polled_per_frame() {
        let (ingest, station, flight_state) = ingest();
        ingest.handle_event(SessionEvent::StreamStarted);

        // Ground sample calibrates, airborne samples track against it.
        ingest.handle_frame(&nav_frame(0, 37.0, -122.0, 3.0));
        flight_state.set_flying(true);
        ingest.handle_frame(&nav_frame(33_333, 37.0, -122.0, 13.0));

        let snapshot = station.read().unwrap();
        assert_eq!(snapshot.takeoff_altitude, 3.0);
        assert_eq!(snapshot.altitude, 10.0);
    }

    #[test]
    fn test_stream_stopped_event_clears_snapshot() {
        let (ingest, station, _) = ingest();
        ingest.handle_event(SessionEvent::StreamStarted);
        ingest.handle_frame(&nav_frame(0, 37.0, -122.0, 12.0));
        assert!(station.read().is_some());

        ingest.handle_event(SessionEvent::StreamStopped);
        assert!(station.read().is_none());
    }

    #[test]
    fn test_run_consumes_frames_until_channels_close() {
        tokio_test::block_on(async {
            let (ingest, station, flight_state) = ingest();
            let (frame_tx, frame_rx) = mpsc::channel(16);
            let (event_tx, event_rx) = mpsc::channel(16);

            let task = tokio::spawn(async move { ingest.run(frame_rx, event_rx).await });

            event_tx.send(SessionEvent::StreamStarted).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;

            frame_tx.send(nav_frame(0, 37.0, -122.0, 3.0)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            flight_state.set_flying(true);
            frame_tx.send(nav_frame(33_333, 37.0, -122.0, 8.0)).await.unwrap();

            drop(frame_tx);
            drop(event_tx);
            task.await.unwrap();

            let snapshot = station.read().unwrap();
            assert_eq!(snapshot.takeoff_altitude, 3.0);
            assert_eq!(snapshot.altitude, 5.0);
        });
    }
}
