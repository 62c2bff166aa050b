//! Cascaded angle -> velocity -> jerk smoothing per channel.
//!
//! Each channel is a short pipeline of independent one-pole stages:
//!
//! ```text
//! unwrapped angle -> Ema -> SmoothedDerivative (velocity) -> SmoothedDerivative (jerk)
//! ```
//!
//! The jerk stage exists only on the elbow channel; upper-arm smoothness is
//! not scored. A channel that receives no data for a sample is not advanced.

use crate::config::EvaluatorConfig;
use crate::math::ema::{Ema, SmoothedDerivative};

/// Smoothed estimates of one channel after an update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelEstimate {
    /// Smoothed angle (degrees).
    pub angle: Option<f64>,
    /// Smoothed angular velocity (degrees/s).
    pub velocity: Option<f64>,
    /// Smoothed jerk (degrees/s^2 of the smoothed velocity), if tracked.
    pub jerk: Option<f64>,
}

/// Filter pipeline for a single angle channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFilter {
    angle: Ema,
    velocity: SmoothedDerivative,
    jerk: Option<SmoothedDerivative>,
}

impl ChannelFilter {
    /// Angle and velocity stages only.
    #[must_use]
    pub const fn new(angle_alpha: f64, velocity_alpha: f64) -> Self {
        Self {
            angle: Ema::new(angle_alpha),
            velocity: SmoothedDerivative::new(velocity_alpha),
            jerk: None,
        }
    }

    /// Angle, velocity and jerk stages.
    #[must_use]
    pub const fn with_jerk(angle_alpha: f64, velocity_alpha: f64, jerk_alpha: f64) -> Self {
        Self {
            angle: Ema::new(angle_alpha),
            velocity: SmoothedDerivative::new(velocity_alpha),
            jerk: Some(SmoothedDerivative::new(jerk_alpha)),
        }
    }

    /// Feed an unwrapped angle sampled `dt` seconds after the previous one.
    ///
    /// `None` leaves every stage untouched.
    pub fn update(&mut self, unwrapped: Option<f64>, dt: f64) -> ChannelEstimate {
        if let Some(angle) = unwrapped {
            let smoothed = self.angle.update(angle);
            if let Some(velocity) = self.velocity.update(smoothed, dt) {
                if let Some(jerk) = self.jerk.as_mut() {
                    jerk.update(velocity, dt);
                }
            }
        }
        self.estimate()
    }

    /// Current estimates without advancing.
    #[must_use]
    pub fn estimate(&self) -> ChannelEstimate {
        ChannelEstimate {
            angle: self.angle.value(),
            velocity: self.velocity.value(),
            jerk: self.jerk.as_ref().and_then(SmoothedDerivative::value),
        }
    }
}

/// Both channels of the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    /// Elbow-angle proxy, with jerk tracking.
    pub elbow: ChannelFilter,
    /// Upper-arm pitch.
    pub upper_arm: ChannelFilter,
}

impl FilterChain {
    /// Build both channels from the configured coefficients.
    #[must_use]
    pub fn new(config: &EvaluatorConfig) -> Self {
        Self {
            elbow: ChannelFilter::with_jerk(
                config.angle_alpha,
                config.velocity_alpha,
                config.jerk_alpha,
            ),
            upper_arm: ChannelFilter::new(config.angle_alpha, config.velocity_alpha),
        }
    }

    /// Advance both channels with one sample's unwrapped angles.
    pub fn update(
        &mut self,
        elbow: Option<f64>,
        upper_arm: Option<f64>,
        dt: f64,
    ) -> (ChannelEstimate, ChannelEstimate) {
        (self.elbow.update(elbow, dt), self.upper_arm.update(upper_arm, dt))
    }
}
