//! Inbound packet and outbound snapshot contracts.
//!
//! A [`Packet`] carries the only three fields the evaluator reads. On the
//! bridge's JSON wire format they are named `seq`, `dP` (forearm minus
//! upper-arm pitch, used as the elbow angle proxy) and `p0` (upper-arm
//! pitch). Every other axis in the payload is ignored.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sample of the joint-angle stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Packet {
    /// Wrapping 16-bit sequence counter.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seq: Option<u16>,
    /// Elbow angle proxy (degrees).
    #[cfg_attr(feature = "serde", serde(default, rename = "dP"))]
    pub elbow_angle_proxy: Option<f64>,
    /// Upper-arm pitch (degrees).
    #[cfg_attr(feature = "serde", serde(default, rename = "p0"))]
    pub upper_arm_pitch: Option<f64>,
}

impl Packet {
    /// Packet with every field present.
    #[must_use]
    pub const fn new(seq: u16, elbow_angle_proxy: f64, upper_arm_pitch: f64) -> Self {
        Self {
            seq: Some(seq),
            elbow_angle_proxy: Some(elbow_angle_proxy),
            upper_arm_pitch: Some(upper_arm_pitch),
        }
    }

    /// Packet without a sequence counter.
    #[must_use]
    pub const fn unsequenced(elbow_angle_proxy: f64, upper_arm_pitch: f64) -> Self {
        Self {
            seq: None,
            elbow_angle_proxy: Some(elbow_angle_proxy),
            upper_arm_pitch: Some(upper_arm_pitch),
        }
    }

    /// Decode a bridge JSON payload.
    ///
    /// Missing or `null` fields become absent; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EvaluatorError::Json`] when the payload is not a JSON
    /// object with the expected field types.
    #[cfg(feature = "serde")]
    pub fn from_json(payload: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Smoothed state returned after every update.
///
/// Fields stay `None` until the filter chain has produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// Smoothed elbow angle (degrees).
    #[cfg_attr(feature = "serde", serde(rename = "elbow_angle_deg"))]
    pub elbow_angle: Option<f64>,
    /// Smoothed elbow velocity (degrees/s).
    #[cfg_attr(feature = "serde", serde(rename = "elbow_vel_deg_s"))]
    pub elbow_vel: Option<f64>,
    /// Smoothed upper-arm angle (degrees).
    #[cfg_attr(feature = "serde", serde(rename = "upperarm_angle_deg"))]
    pub upperarm_angle: Option<f64>,
    /// Smoothed upper-arm velocity (degrees/s).
    #[cfg_attr(feature = "serde", serde(rename = "upperarm_vel_deg_s"))]
    pub upperarm_vel: Option<f64>,
}
