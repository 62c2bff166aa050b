//! Configuration for the streaming evaluator.
//!
//! This module provides the [`EvaluatorConfig`] struct which centralizes the
//! tunable parameters of the filter chain, timing reconstruction and
//! calibration, along with presets for common sensor rates.
//!
//! # Example
//!
//! ```
//! use rep_quality::EvaluatorConfig;
//!
//! // Use default configuration (50 Hz, alpha 0.2)
//! let config = EvaluatorConfig::default();
//!
//! // Use a preset and tweak it
//! let fast = EvaluatorConfig::wrist_imu().with_alpha(0.3);
//! assert!(fast.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EvaluatorError, Result};

/// Default nominal sample rate of the joint-angle stream.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 50.0;

/// Default one-pole smoothing coefficient for every stage.
pub const DEFAULT_ALPHA: f64 = 0.2;

/// Lower clamp for the reconstructed inter-sample time (seconds).
pub const DEFAULT_DT_MIN_S: f64 = 0.001;

/// Upper clamp for the reconstructed inter-sample time (seconds).
pub const DEFAULT_DT_MAX_S: f64 = 0.1;

/// Configuration for the evaluator.
///
/// # Smoothing
///
/// - `angle_alpha`: smoothing of the unwrapped angle.
/// - `velocity_alpha`: smoothing of the angle derivative.
/// - `jerk_alpha`: smoothing of the velocity derivative (elbow only).
///
/// # Timing
///
/// `dt` is derived from sequence-number distance times `1 / sample_rate_hz`,
/// then clamped into `[dt_min_s, dt_max_s]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvaluatorConfig {
    /// Nominal sample rate (Hz). Also sets the automatic calibration window:
    /// `ceil(sample_rate_hz)` samples, about one second of data.
    pub sample_rate_hz: f64,

    /// One-pole coefficient for angle smoothing.
    pub angle_alpha: f64,

    /// One-pole coefficient for velocity smoothing.
    pub velocity_alpha: f64,

    /// One-pole coefficient for jerk smoothing.
    pub jerk_alpha: f64,

    /// Minimum reconstructed dt (seconds).
    pub dt_min_s: f64,

    /// Maximum reconstructed dt (seconds).
    pub dt_max_s: f64,

    /// Percentile (0-100) used for the jerk smoothness score.
    pub jerk_percentile: f64,

    /// Floor applied to ROM before dividing sway by it (degrees).
    pub rom_floor_deg: f64,

    /// Whether passive first-second calibration is armed at start.
    pub auto_calibration: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            angle_alpha: DEFAULT_ALPHA,
            velocity_alpha: DEFAULT_ALPHA,
            jerk_alpha: DEFAULT_ALPHA,
            dt_min_s: DEFAULT_DT_MIN_S,
            dt_max_s: DEFAULT_DT_MAX_S,
            jerk_percentile: 95.0,
            rom_floor_deg: 1e-6,
            auto_calibration: true,
        }
    }
}

impl EvaluatorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(EvaluatorError::invalid_config(
                "sample_rate_hz must be positive",
            ));
        }
        for (name, alpha) in [
            ("angle_alpha", self.angle_alpha),
            ("velocity_alpha", self.velocity_alpha),
            ("jerk_alpha", self.jerk_alpha),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(EvaluatorError::invalid_config(format!(
                    "{name} must be in (0, 1]"
                )));
            }
        }
        if !(self.dt_min_s > 0.0) {
            return Err(EvaluatorError::invalid_config("dt_min_s must be positive"));
        }
        if !(self.dt_max_s >= self.dt_min_s) {
            return Err(EvaluatorError::invalid_config(
                "dt_max_s must be >= dt_min_s",
            ));
        }
        if !(0.0..=100.0).contains(&self.jerk_percentile) {
            return Err(EvaluatorError::invalid_config(
                "jerk_percentile must be in [0, 100]",
            ));
        }
        if !(self.rom_floor_deg > 0.0) {
            return Err(EvaluatorError::invalid_config(
                "rom_floor_deg must be positive",
            ));
        }
        Ok(())
    }

    /// Preset for wrist-mounted IMUs streaming at 100 Hz.
    #[must_use]
    pub fn wrist_imu() -> Self {
        Self {
            sample_rate_hz: 100.0,
            ..Self::default()
        }
    }

    /// Preset for throttled links streaming at 25 Hz.
    ///
    /// Lighter smoothing keeps the lag comparable to the 50 Hz default.
    #[must_use]
    pub fn low_rate() -> Self {
        Self {
            sample_rate_hz: 25.0,
            angle_alpha: 0.35,
            velocity_alpha: 0.35,
            jerk_alpha: 0.35,
            ..Self::default()
        }
    }

    /// Nominal sample period (seconds).
    #[must_use]
    pub fn nominal_period_s(&self) -> f64 {
        1.0 / self.sample_rate_hz
    }

    /// Number of finite samples the automatic calibration averages.
    #[must_use]
    pub fn auto_calibration_samples(&self) -> usize {
        (self.sample_rate_hz.ceil() as usize).max(1)
    }

    /// Set the nominal sample rate.
    #[must_use]
    pub const fn with_sample_rate(mut self, sample_rate_hz: f64) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Set the same smoothing coefficient on every stage.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.angle_alpha = alpha;
        self.velocity_alpha = alpha;
        self.jerk_alpha = alpha;
        self
    }

    /// Set the dt clamp range.
    #[must_use]
    pub const fn with_dt_bounds(mut self, dt_min_s: f64, dt_max_s: f64) -> Self {
        self.dt_min_s = dt_min_s;
        self.dt_max_s = dt_max_s;
        self
    }

    /// Enable/disable passive automatic calibration.
    #[must_use]
    pub const fn with_auto_calibration(mut self, enabled: bool) -> Self {
        self.auto_calibration = enabled;
        self
    }
}
