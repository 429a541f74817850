//! # Telemetry Bridge
//!
//! Demo wiring for the telemetry-ingestion core: a synthetic frame source
//! stands in for the camera link and feeds the calibration state machine,
//! while a pull-based consumer reads the published snapshot on a timer and
//! mirrors it to rotating JSONL logs.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod config;
mod error;
mod frame;
mod session;
mod telemetry;

use config::Config;
use frame::{encode_nav_metadata, VideoFrame};
use session::{FlightStateSignal, SessionEvent, StreamIngest};
use telemetry::logger::JsonlLogger;
use telemetry::types::RawNavigationSample;
use telemetry::TelemetryStation;

/// Simulated ground altitude above sea level in meters.
const GROUND_ALTITUDE_M: f64 = 25.0;

/// Simulated climb rate once airborne, in meters per second.
const CLIMB_RATE_M_PER_S: f64 = 1.5;

/// Seconds the simulated aircraft sits on the ground before takeoff.
const TAKEOFF_AFTER_S: u64 = 3;

/// Every Nth frame is delivered without a navigation payload.
const BARE_FRAME_EVERY: u64 = 50;

/// Every Nth frame reports the no-fix sentinel (latitude 0, longitude 0).
const NO_FIX_FRAME_EVERY: u64 = 97;

/// Number of consumer reads between status log messages.
const STATUS_LOG_INTERVAL_READS: u64 = 50;

/// Builds the synthetic navigation sample for one frame of the simulated
/// flight: stationary on the ground, then a steady climb.
fn synthetic_sample(frame_index: u64, frame_rate_hz: u32) -> RawNavigationSample {
    let elapsed_s = frame_index as f64 / frame_rate_hz as f64;
    let airborne_s = (elapsed_s - TAKEOFF_AFTER_S as f64).max(0.0);

    RawNavigationSample {
        latitude: 37.7749,
        longitude: -122.4194,
        altitude: GROUND_ALTITUDE_M + airborne_s * CLIMB_RATE_M_PER_S,
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
        speed_down: if airborne_s > 0.0 { -CLIMB_RATE_M_PER_S } else { 0.0 },
    }
}

/// Builds one simulated frame, occasionally degraded to exercise the
/// skip-and-suppress paths.
fn synthetic_frame(frame_index: u64, frame_rate_hz: u32) -> VideoFrame {
    let pts_us = frame_index * 1_000_000 / frame_rate_hz as u64;

    if frame_index > 0 && frame_index % BARE_FRAME_EVERY == 0 {
        return VideoFrame::bare(pts_us, 1280, 720);
    }

    let mut sample = synthetic_sample(frame_index, frame_rate_hz);
    if frame_index > 0 && frame_index % NO_FIX_FRAME_EVERY == 0 {
        sample.latitude = 0.0;
        sample.longitude = 0.0;
    }

    VideoFrame::with_nav_metadata(pts_us, 1280, 720, encode_nav_metadata(&sample))
}

/// Main entry point for the Telemetry Bridge demo
///
/// Wires the ports around the telemetry station the way a host application
/// would: a frame channel from the camera link, a session-event channel from
/// the lifecycle adapter, a shared flight-state signal, and a pull-based
/// consumer on its own timer.
///
/// # Errors
///
/// Returns error if the configuration is invalid or the JSONL log directory
/// cannot be created.
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    // Console output plus a rolling file next to the JSONL telemetry logs.
    std::fs::create_dir_all(&config.telemetry.log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&config.telemetry.log_dir, "telemetry-bridge.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    info!("Telemetry Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let station = Arc::new(TelemetryStation::with_staleness_timeout(
        chrono::Duration::milliseconds(config.stream.staleness_timeout_ms as i64),
    ));
    let flight_state = FlightStateSignal::new();

    let (frame_tx, frame_rx) = mpsc::channel::<VideoFrame>(64);
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(8);

    let ingest = StreamIngest::new(Arc::clone(&station), flight_state.clone());
    let ingest_task = tokio::spawn(async move { ingest.run(frame_rx, event_rx).await });

    // Synthetic camera link: one stream start, then frames at the native
    // rate until the channel closes.
    let frame_rate_hz = config.stream.frame_rate_hz;
    let producer_flight_state = flight_state.clone();
    let producer_task = tokio::spawn(async move {
        if event_tx.send(SessionEvent::StreamStarted).await.is_err() {
            return;
        }

        let takeoff_frame = TAKEOFF_AFTER_S * frame_rate_hz as u64;
        let mut ticker = interval(Duration::from_micros(1_000_000 / frame_rate_hz as u64));
        let mut frame_index: u64 = 0;

        loop {
            ticker.tick().await;
            producer_flight_state.set_flying(frame_index >= takeoff_frame);

            let frame = synthetic_frame(frame_index, frame_rate_hz);
            if frame_tx.send(frame).await.is_err() {
                break;
            }
            frame_index += 1;
        }
    });

    let mut jsonl_logger = if config.telemetry.enabled {
        Some(JsonlLogger::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )?)
    } else {
        None
    };

    info!(
        "Consuming synthetic stream at {}Hz (takeoff after {}s), reading every {}ms",
        frame_rate_hz, TAKEOFF_AFTER_S, config.telemetry.log_interval_ms
    );
    info!("Press Ctrl+C to exit");

    let mut read_interval = interval(Duration::from_millis(config.telemetry.log_interval_ms));
    let mut reads: u64 = 0;
    let mut snapshots_seen: u64 = 0;

    // Consumer loop: pull-based reads on our own timer, independent of the
    // frame-delivery path.
    loop {
        tokio::select! {
            _ = read_interval.tick() => {
                reads += 1;

                if let Some(snapshot) = station.read() {
                    snapshots_seen += 1;

                    if let Some(logger) = jsonl_logger.as_mut() {
                        if let Err(e) = logger.log(&snapshot, Utc::now()) {
                            warn!("Failed to write telemetry record: {}", e);
                        }
                    }

                    if reads % STATUS_LOG_INTERVAL_READS == 0 {
                        info!(
                            "Telemetry: lat {:.4} lon {:.4} alt {:.1}m (takeoff ref {:.1}m), flying: {}",
                            snapshot.latitude,
                            snapshot.longitude,
                            snapshot.altitude,
                            snapshot.takeoff_altitude,
                            flight_state.is_flying(),
                        );
                    }
                } else if reads % STATUS_LOG_INTERVAL_READS == 0 {
                    info!("Telemetry unavailable");
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Reads: {}, snapshots observed: {}", reads, snapshots_seen);
                break;
            }
        }
    }

    producer_task.abort();
    ingest_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_on_ground_before_takeoff() {
        let sample = synthetic_sample(0, 30);
        assert_eq!(sample.altitude, GROUND_ALTITUDE_M);
        assert_eq!(sample.speed_down, 0.0);

        // Last ground frame.
        let sample = synthetic_sample(TAKEOFF_AFTER_S * 30, 30);
        assert_eq!(sample.altitude, GROUND_ALTITUDE_M);
    }

    #[test]
    fn test_sample_climbs_after_takeoff() {
        // One second past takeoff at 30fps.
        let sample = synthetic_sample((TAKEOFF_AFTER_S + 1) * 30, 30);
        assert_eq!(sample.altitude, GROUND_ALTITUDE_M + CLIMB_RATE_M_PER_S);
        assert_eq!(sample.speed_down, -CLIMB_RATE_M_PER_S);
    }

    #[test]
    fn test_bare_frames_carry_no_payload() {
        let frame = synthetic_frame(BARE_FRAME_EVERY, 30);
        assert!(frame.nav_sample().is_none());
    }

    #[test]
    fn test_no_fix_frames_carry_zero_coordinates() {
        let frame = synthetic_frame(NO_FIX_FRAME_EVERY, 30);
        let sample = frame.nav_sample().unwrap();
        assert_eq!(sample.latitude, 0.0);
        assert_eq!(sample.longitude, 0.0);
    }

    #[test]
    fn test_ordinary_frames_carry_valid_fix() {
        let frame = synthetic_frame(1, 30);
        let sample = frame.nav_sample().unwrap();
        assert!(sample.latitude != 0.0);
        assert!(!sample.altitude.is_nan());
    }
}
