//! Raw sensor notification decoding.
//!
//! The dual-IMU firmware notifies fixed 14-byte frames, little endian:
//!
//! | Offset | Type | Field |
//! |--------|------|-------|
//! | 0 | i16 | upper-arm roll |
//! | 2 | i16 | upper-arm pitch |
//! | 4 | i16 | upper-arm yaw |
//! | 6 | i16 | forearm roll |
//! | 8 | i16 | forearm pitch |
//! | 10 | i16 | forearm yaw |
//! | 12 | u16 | sequence counter |
//!
//! Angles are in hundredths of a degree. Trailing bytes are ignored.

use crate::error::{EvaluatorError, Result};
use crate::packet::Packet;

/// Size of one notification frame in bytes.
pub const FRAME_LEN: usize = 14;

/// Degrees per raw angle unit.
pub const DEG_PER_UNIT: f64 = 0.01;

/// Euler angles of both IMUs from one notification (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuFrame {
    /// Upper-arm roll.
    pub r0: f64,
    /// Upper-arm pitch.
    pub p0: f64,
    /// Upper-arm yaw.
    pub y0: f64,
    /// Forearm roll.
    pub r1: f64,
    /// Forearm pitch.
    pub p1: f64,
    /// Forearm yaw.
    pub y1: f64,
    /// Sequence counter.
    pub seq: u16,
}

impl ImuFrame {
    /// Decode one notification.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::FrameTooShort`] for buffers under
    /// [`FRAME_LEN`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_LEN {
            return Err(EvaluatorError::frame_too_short(FRAME_LEN, bytes.len()));
        }
        let angle = |i: usize| {
            f64::from(i16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]])) * DEG_PER_UNIT
        };
        Ok(Self {
            r0: angle(0),
            p0: angle(1),
            y0: angle(2),
            r1: angle(3),
            p1: angle(4),
            y1: angle(5),
            seq: u16::from_le_bytes([bytes[12], bytes[13]]),
        })
    }

    /// Forearm minus upper-arm pitch, the elbow angle proxy.
    #[must_use]
    pub fn pitch_diff(&self) -> f64 {
        self.p1 - self.p0
    }

    /// Forearm minus upper-arm roll.
    #[must_use]
    pub fn roll_diff(&self) -> f64 {
        self.r1 - self.r0
    }

    /// Forearm minus upper-arm yaw.
    #[must_use]
    pub fn yaw_diff(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The evaluator's view of this frame.
    #[must_use]
    pub fn to_packet(&self) -> Packet {
        Packet::new(self.seq, self.pitch_diff(), self.p0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn encode(angles: [i16; 6], seq: u16) -> Vec<u8> {
        let mut bytes: Vec<u8> = angles.iter().flat_map(|a| a.to_le_bytes()).collect();
        bytes.extend_from_slice(&seq.to_le_bytes());
        bytes
    }

    #[test]
    fn test_decode_known_frame() {
        let bytes = encode([100, -1550, 18000, -250, 9025, -18000], 65534);
        let frame = ImuFrame::decode(&bytes).unwrap();

        assert_relative_eq!(frame.r0, 1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.p0, -15.5, epsilon = 1e-9);
        assert_relative_eq!(frame.y0, 180.0, epsilon = 1e-9);
        assert_relative_eq!(frame.r1, -2.5, epsilon = 1e-9);
        assert_relative_eq!(frame.p1, 90.25, epsilon = 1e-9);
        assert_relative_eq!(frame.y1, -180.0, epsilon = 1e-9);
        assert_eq!(frame.seq, 65534);

        assert_relative_eq!(frame.pitch_diff(), 105.75, epsilon = 1e-9);
        assert_relative_eq!(frame.roll_diff(), -3.5, epsilon = 1e-9);
        assert_relative_eq!(frame.yaw_diff(), -360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_to_packet() {
        let bytes = encode([0, 1000, 0, 0, 4000, 0], 3);
        let packet = ImuFrame::decode(&bytes).unwrap().to_packet();
        assert_eq!(packet.seq, Some(3));
        assert_relative_eq!(packet.elbow_angle_proxy.unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(packet.upper_arm_pitch.unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = encode([1, 2, 3, 4, 5, 6], 9);
        bytes.extend_from_slice(&[0xFF, 0xEE]);
        assert_eq!(ImuFrame::decode(&bytes).unwrap().seq, 9);
    }

    #[test]
    fn test_short_frame_rejected() {
        let bytes = encode([0; 6], 0);
        let err = ImuFrame::decode(&bytes[..13]).unwrap_err();
        assert!(matches!(
            err,
            EvaluatorError::FrameTooShort { min: 14, actual: 13 }
        ));
    }
}
