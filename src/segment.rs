//! Per-repetition sample buffering.
//!
//! The segmenter does not decide where reps begin or end; it records whatever
//! interval it is told to. A rep is open while a [`RepBuffer`] is installed.

use tracing::{trace, warn};

use crate::filter::ChannelEstimate;

/// Smoothed values collected during one repetition.
///
/// Each sequence only holds samples where that quantity was defined, so the
/// sequences may differ in length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepBuffer {
    /// Smoothed elbow angle (degrees).
    pub elbow_angles: Vec<f64>,
    /// Smoothed elbow velocity (degrees/s).
    pub elbow_velocities: Vec<f64>,
    /// Smoothed upper-arm angle (degrees).
    pub upper_arm_angles: Vec<f64>,
    /// Smoothed upper-arm velocity (degrees/s).
    pub upper_arm_velocities: Vec<f64>,
    /// Smoothed elbow jerk.
    pub elbow_jerks: Vec<f64>,
}

impl RepBuffer {
    /// Append the defined values of one sample.
    pub fn record(&mut self, elbow: &ChannelEstimate, upper_arm: &ChannelEstimate) {
        self.elbow_angles.extend(elbow.angle);
        self.elbow_velocities.extend(elbow.velocity);
        self.elbow_jerks.extend(elbow.jerk);
        self.upper_arm_angles.extend(upper_arm.angle);
        self.upper_arm_velocities.extend(upper_arm.velocity);
    }

    /// Number of elbow-angle samples recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elbow_angles.len()
    }

    /// Whether nothing at all was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elbow_angles.is_empty()
            && self.elbow_velocities.is_empty()
            && self.upper_arm_angles.is_empty()
            && self.upper_arm_velocities.is_empty()
            && self.elbow_jerks.is_empty()
    }
}

/// Idle / active-rep state, holding the open rep's buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepSegmenter {
    active: Option<RepBuffer>,
}

impl RepSegmenter {
    /// Create an idle segmenter.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Open a rep with a fresh buffer.
    ///
    /// An already-open rep is discarded and replaced.
    pub fn start(&mut self) {
        if let Some(previous) = self.active.replace(RepBuffer::default()) {
            warn!(
                discarded_samples = previous.len(),
                "rep started while another was active"
            );
        } else {
            trace!("rep started");
        }
    }

    /// Record one sample if a rep is open.
    pub fn record(&mut self, elbow: &ChannelEstimate, upper_arm: &ChannelEstimate) {
        if let Some(buffer) = self.active.as_mut() {
            buffer.record(elbow, upper_arm);
        }
    }

    /// Close the open rep and hand back its buffer, `None` when idle.
    pub fn finish(&mut self) -> Option<RepBuffer> {
        self.active.take()
    }

    /// Whether a rep is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Buffer of the open rep.
    #[must_use]
    pub const fn current(&self) -> Option<&RepBuffer> {
        self.active.as_ref()
    }
}
