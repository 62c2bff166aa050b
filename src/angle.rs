//! Offset removal and unwrap for one angle channel.

use crate::math::angle::unwrap_deg;

/// Turns raw, circularly-measured readings into a continuous angle.
///
/// Holds only the last unwrapped value. Readings that are absent, or that are
/// not finite once the calibration offset is removed, leave it untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleReconstructor {
    last_unwrapped: Option<f64>,
}

impl AngleReconstructor {
    /// Create a reconstructor with no history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_unwrapped: None,
        }
    }

    /// Reconstruct one reading against the calibration `offset`.
    ///
    /// Returns the unwrapped angle, or `None` when this sample carries no
    /// usable data for the channel.
    pub fn reconstruct(&mut self, raw_deg: Option<f64>, offset_deg: f64) -> Option<f64> {
        let corrected = raw_deg? - offset_deg;
        if !corrected.is_finite() {
            return None;
        }
        let unwrapped = unwrap_deg(corrected, self.last_unwrapped);
        if !unwrapped.is_finite() {
            return None;
        }
        self.last_unwrapped = Some(unwrapped);
        Some(unwrapped)
    }

    /// Last unwrapped value.
    #[must_use]
    pub const fn last(&self) -> Option<f64> {
        self.last_unwrapped
    }

    /// Forget history.
    pub fn reset(&mut self) {
        self.last_unwrapped = None;
    }
}
