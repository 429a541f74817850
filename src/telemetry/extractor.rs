//! # Telemetry Extractor
//!
//! Maps one raw navigation sample into a structured telemetry reading.
//!
//! Extraction is total: every sample maps to exactly one reading with
//! identical field values, only regrouped into semantic types. No filtering
//! or calibration happens here; NaN and zero sentinels pass through
//! unchanged and are judged later by the calibration state machine.

use super::types::{Quaternion, RawNavigationSample, TelemetryReading, Velocity};

/// Extracts a structured reading from a raw navigation sample.
///
/// Side-effect free; no failure mode.
///
/// # Examples
///
/// ```
/// use telemetry_bridge::telemetry::{extract_reading, RawNavigationSample};
///
/// let sample = RawNavigationSample {
///     latitude: 37.7749,
///     longitude: -122.4194,
///     altitude: 12.5,
///     drone_quat_x: 0.0,
///     drone_quat_y: 0.0,
///     drone_quat_z: 0.0,
///     drone_quat_w: 1.0,
///     frame_quat_x: 0.0,
///     frame_quat_y: 0.0,
///     frame_quat_z: 0.0,
///     frame_quat_w: 1.0,
///     speed_north: 1.0,
///     speed_east: -0.5,
///     speed_down: 0.0,
/// };
///
/// let reading = extract_reading(&sample);
/// assert_eq!(reading.altitude, 12.5);
/// assert_eq!(reading.velocity.north, 1.0);
/// ```
#[must_use]
pub fn extract_reading(sample: &RawNavigationSample) -> TelemetryReading {
    TelemetryReading {
        latitude: sample.latitude,
        longitude: sample.longitude,
        altitude: sample.altitude,
        drone_attitude: Quaternion {
            x: sample.drone_quat_x,
            y: sample.drone_quat_y,
            z: sample.drone_quat_z,
            w: sample.drone_quat_w,
        },
        frame_attitude: Quaternion {
            x: sample.frame_quat_x,
            y: sample.frame_quat_y,
            z: sample.frame_quat_z,
            w: sample.frame_quat_w,
        },
        velocity: Velocity {
            north: sample.speed_north,
            east: sample.speed_east,
            down: sample.speed_down,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(latitude: f64, longitude: f64, altitude: f64) -> RawNavigationSample {
        RawNavigationSample {
            latitude,
            longitude,
            altitude,
            drone_quat_x: 0.1,
            drone_quat_y: 0.2,
            drone_quat_z: 0.3,
            drone_quat_w: 0.9,
            frame_quat_x: -0.1,
            frame_quat_y: -0.2,
            frame_quat_z: -0.3,
            frame_quat_w: 0.9,
            speed_north: 3.0,
            speed_east: -1.5,
            speed_down: 0.25,
        }
    }

    #[test]
    fn test_extract_copies_all_fields() {
        let reading = extract_reading(&sample(48.8566, 2.3522, 35.0));

        assert_eq!(reading.latitude, 48.8566);
        assert_eq!(reading.longitude, 2.3522);
        assert_eq!(reading.altitude, 35.0);
        assert_eq!(reading.drone_attitude.x, 0.1);
        assert_eq!(reading.drone_attitude.w, 0.9);
        assert_eq!(reading.frame_attitude.z, -0.3);
        assert_eq!(reading.velocity.north, 3.0);
        assert_eq!(reading.velocity.east, -1.5);
        assert_eq!(reading.velocity.down, 0.25);
    }

    #[test]
    fn test_extract_is_total_over_nan() {
        // Extraction never filters; NaN passes through for the state
        // machine to reject.
        let reading = extract_reading(&sample(f64::NAN, 2.3522, 35.0));
        assert!(reading.latitude.is_nan());
        assert_eq!(reading.longitude, 2.3522);
    }

    #[test]
    fn test_extract_is_total_over_zero_fix_sentinel() {
        let reading = extract_reading(&sample(0.0, 0.0, 10.0));
        assert_eq!(reading.latitude, 0.0);
        assert_eq!(reading.longitude, 0.0);
        assert_eq!(reading.altitude, 10.0);
    }
}
