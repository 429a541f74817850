//! # Frame Module
//!
//! The frame-source boundary: opaque decoded video frames and the
//! navigation metadata block embedded in them by the flight firmware.
//!
//! Video decoding and stream transport are out of scope; a [`VideoFrame`]
//! here is already decoded and only the metadata side-channel matters.
//! Conversion to a navigation sample fails silently (`None`) when a frame
//! carries no payload, in which case the frame is skipped upstream with no
//! call into the state machine.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::telemetry::RawNavigationSample;

/// Magic bytes marking a navigation metadata block ("NV").
pub const NAV_METADATA_MAGIC: [u8; 2] = [0x4E, 0x56];

/// Navigation metadata layout version understood by this decoder.
pub const NAV_METADATA_VERSION: u8 = 1;

/// Total size of a navigation metadata block:
/// magic(2) + version(1) + 14 big-endian f64 fields.
pub const NAV_METADATA_LEN: usize = 3 + 14 * 8;

/// A decoded video frame handle.
///
/// Carries presentation metadata and, when the firmware provided one, the
/// raw navigation metadata block for this frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Presentation timestamp in microseconds.
    pub pts_us: u64,
    pub width: u32,
    pub height: u32,
    /// Raw navigation metadata block, if the frame carried one.
    pub nav_metadata: Option<Bytes>,
}

impl VideoFrame {
    /// Creates a frame without navigation metadata.
    #[must_use]
    pub fn bare(pts_us: u64, width: u32, height: u32) -> Self {
        Self {
            pts_us,
            width,
            height,
            nav_metadata: None,
        }
    }

    /// Creates a frame carrying an encoded navigation metadata block.
    #[must_use]
    pub fn with_nav_metadata(pts_us: u64, width: u32, height: u32, metadata: Bytes) -> Self {
        Self {
            pts_us,
            width,
            height,
            nav_metadata: Some(metadata),
        }
    }

    /// Decodes the embedded navigation sample, if present and well-formed.
    ///
    /// Returns `None` when the frame carries no metadata, the block is
    /// truncated, or magic/version do not match. There is no error path:
    /// a frame without a usable sample is simply skipped.
    #[must_use]
    pub fn nav_sample(&self) -> Option<RawNavigationSample> {
        let metadata = self.nav_metadata.as_ref()?;
        decode_nav_metadata(metadata)
    }
}

/// Decodes a navigation metadata block.
fn decode_nav_metadata(block: &Bytes) -> Option<RawNavigationSample> {
    if block.len() < NAV_METADATA_LEN {
        return None;
    }

    let mut buf = block.clone();
    if buf.get_u8() != NAV_METADATA_MAGIC[0] || buf.get_u8() != NAV_METADATA_MAGIC[1] {
        return None;
    }
    if buf.get_u8() != NAV_METADATA_VERSION {
        return None;
    }

    Some(RawNavigationSample {
        latitude: buf.get_f64(),
        longitude: buf.get_f64(),
        altitude: buf.get_f64(),
        drone_quat_x: buf.get_f64(),
        drone_quat_y: buf.get_f64(),
        drone_quat_z: buf.get_f64(),
        drone_quat_w: buf.get_f64(),
        frame_quat_x: buf.get_f64(),
        frame_quat_y: buf.get_f64(),
        frame_quat_z: buf.get_f64(),
        frame_quat_w: buf.get_f64(),
        speed_north: buf.get_f64(),
        speed_east: buf.get_f64(),
        speed_down: buf.get_f64(),
    })
}

/// Encodes a navigation sample into a metadata block.
///
/// Producer-side counterpart of [`VideoFrame::nav_sample`], used by replay
/// and synthetic frame sources.
#[must_use]
pub fn encode_nav_metadata(sample: &RawNavigationSample) -> Bytes {
    let mut buf = BytesMut::with_capacity(NAV_METADATA_LEN);
    buf.put_slice(&NAV_METADATA_MAGIC);
    buf.put_u8(NAV_METADATA_VERSION);
    buf.put_f64(sample.latitude);
    buf.put_f64(sample.longitude);
    buf.put_f64(sample.altitude);
    buf.put_f64(sample.drone_quat_x);
    buf.put_f64(sample.drone_quat_y);
    buf.put_f64(sample.drone_quat_z);
    buf.put_f64(sample.drone_quat_w);
    buf.put_f64(sample.frame_quat_x);
    buf.put_f64(sample.frame_quat_y);
    buf.put_f64(sample.frame_quat_z);
    buf.put_f64(sample.frame_quat_w);
    buf.put_f64(sample.speed_north);
    buf.put_f64(sample.speed_east);
    buf.put_f64(sample.speed_down);
    buf.freeze()
}
