//! Per-repetition quality metrics and the form-check hook.
//!
//! [`aggregate`] reduces a closed [`RepBuffer`] into [`RepMetrics`]:
//!
//! | Metric | Definition |
//! |--------|------------|
//! | `rom` | max - min of elbow angle |
//! | `peak_elbow_vel` | max \|v\| of elbow velocity |
//! | `upperarm_sway` | max - min of upper-arm angle |
//! | `swing_ratio` | sway / max(rom, floor) |
//! | `jerk_p95` | nearest-rank percentile of \|jerk\| |
//!
//! Turning metrics into a form verdict is left to a [`FormPolicy`]. The
//! default [`FormChecksDisabled`] never flags anything.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::EvaluatorConfig;
use crate::math::stats::{peak_abs, percentile_nearest_rank, range};
use crate::segment::RepBuffer;

/// Scalar quality metrics of one repetition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepMetrics {
    /// Range of motion of the elbow (degrees).
    #[cfg_attr(feature = "serde", serde(rename = "ROM"))]
    pub rom: f64,
    /// Peak absolute elbow angular velocity (degrees/s).
    pub peak_elbow_vel: f64,
    /// Range of motion of the upper arm (degrees).
    pub upperarm_sway: f64,
    /// Sway normalized by elbow ROM.
    pub swing_ratio: f64,
    /// Smoothness score: high percentile of absolute elbow jerk.
    pub jerk_p95: f64,
}

/// Timing context handed to the form policy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RepTiming {
    /// Duration of the rep as measured by the caller (seconds).
    pub rep_time_s: f64,
    /// Elapsed time in the current set/session (seconds).
    pub session_time_s: f64,
}

/// Form problems the coaching layer knows how to cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FormIssue {
    /// Upper arm moving to generate momentum.
    Swinging,
    /// Unsmooth, jerky motion.
    Jerky,
    /// Rep completed too quickly.
    TooFast,
    /// Rep completed too slowly.
    TooSlow,
    /// Elbow excursion beyond the useful range.
    OverRom,
    /// Elbow excursion too short.
    PartialRom,
}

impl FormIssue {
    /// Short coaching cue for this issue.
    #[must_use]
    pub const fn coach_cue(self) -> &'static str {
        match self {
            Self::Swinging => "Keep upper arm still",
            Self::Jerky => "Smooth it out",
            Self::TooFast => "Slow down",
            Self::TooSlow => "Speed up",
            Self::OverRom => "Don't overextend",
            Self::PartialRom => "Curl higher",
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swinging => "swinging",
            Self::Jerky => "jerky",
            Self::TooFast => "too_fast",
            Self::TooSlow => "too_slow",
            Self::OverRom => "over_rom",
            Self::PartialRom => "partial_rom",
        }
    }
}

/// Pluggable rule turning rep metrics into at most one form issue.
pub trait FormPolicy {
    /// Judge a closed rep.
    fn assess(&mut self, metrics: &RepMetrics, timing: RepTiming) -> Option<FormIssue>;

    /// Drop any per-session state (cooldowns, history).
    fn reset(&mut self) {}
}

/// Policy that never reports an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormChecksDisabled;

impl FormPolicy for FormChecksDisabled {
    fn assess(&mut self, _metrics: &RepMetrics, _timing: RepTiming) -> Option<FormIssue> {
        None
    }
}

/// Outcome of closing a repetition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RepResult {
    /// Quality metrics.
    #[cfg_attr(feature = "serde", serde(rename = "rep_metrics"))]
    pub metrics: RepMetrics,
    /// Issue flagged by the form policy.
    pub issue: Option<FormIssue>,
    /// Cue text for `issue`.
    pub coach_cue: Option<&'static str>,
}

impl RepResult {
    /// All-zero result with no issue, returned when no rep was open.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            metrics: RepMetrics {
                rom: 0.0,
                peak_elbow_vel: 0.0,
                upperarm_sway: 0.0,
                swing_ratio: 0.0,
                jerk_p95: 0.0,
            },
            issue: None,
            coach_cue: None,
        }
    }

    /// Attach an issue and its cue.
    #[must_use]
    pub fn with_issue(metrics: RepMetrics, issue: Option<FormIssue>) -> Self {
        Self {
            metrics,
            issue,
            coach_cue: issue.map(FormIssue::coach_cue),
        }
    }
}

/// Reduce a closed rep buffer to its metrics.
#[must_use]
pub fn aggregate(buffer: &RepBuffer, config: &EvaluatorConfig) -> RepMetrics {
    let rom = range(&buffer.elbow_angles);
    let upperarm_sway = range(&buffer.upper_arm_angles);
    let abs_jerks: Vec<f64> = buffer.elbow_jerks.iter().map(|j| j.abs()).collect();

    RepMetrics {
        rom,
        peak_elbow_vel: peak_abs(&buffer.elbow_velocities),
        upperarm_sway,
        swing_ratio: upperarm_sway / rom.max(config.rom_floor_deg),
        jerk_p95: percentile_nearest_rank(&abs_jerks, config.jerk_percentile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn buffer(angles: &[f64], vels: &[f64], upper: &[f64], jerks: &[f64]) -> RepBuffer {
        RepBuffer {
            elbow_angles: angles.to_vec(),
            elbow_velocities: vels.to_vec(),
            upper_arm_angles: upper.to_vec(),
            upper_arm_velocities: Vec::new(),
            elbow_jerks: jerks.to_vec(),
        }
    }

    #[test]
    fn test_synthetic_rep() {
        let buf = buffer(
            &[0.0, 10.0, 30.0, 25.0, 5.0],
            &[2.0, -1.0, 5.0, -8.0, 3.0],
            &[1.0, 2.5, 4.0],
            &[],
        );
        let m = aggregate(&buf, &EvaluatorConfig::default());
        assert_eq!(m.rom, 30.0);
        assert_eq!(m.peak_elbow_vel, 8.0);
        assert_eq!(m.upperarm_sway, 3.0);
        assert_relative_eq!(m.swing_ratio, 0.1);
        assert_eq!(m.jerk_p95, 0.0);
    }

    #[test]
    fn test_zero_rom_swing_ratio_is_finite() {
        let buf = buffer(&[12.0, 12.0], &[], &[0.0, 5.0], &[]);
        let m = aggregate(&buf, &EvaluatorConfig::default());
        assert_eq!(m.rom, 0.0);
        assert_relative_eq!(m.swing_ratio, 5_000_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_jerk_percentile_uses_absolute_values() {
        let jerks: Vec<f64> = (1..=20)
            .map(|i| if i % 2 == 0 { f64::from(i) } else { -f64::from(i) })
            .collect();
        let buf = buffer(&[], &[], &[], &jerks);
        let m = aggregate(&buf, &EvaluatorConfig::default());
        // |jerk| sorted is 1..=20, index floor(0.95 * 19) = 18
        assert_eq!(m.jerk_p95, 19.0);
    }

    #[test]
    fn test_empty_buffer_is_all_zero() {
        let m = aggregate(&RepBuffer::default(), &EvaluatorConfig::default());
        assert_eq!(m, RepMetrics::default());
    }

    #[test]
    fn test_empty_result() {
        let r = RepResult::empty();
        assert_eq!(r.metrics, RepMetrics::default());
        assert_eq!(r.issue, None);
        assert_eq!(r.coach_cue, None);
        assert_eq!(r, RepResult::default());
    }

    #[test]
    fn test_disabled_policy_never_flags() {
        let mut policy = FormChecksDisabled;
        let wild = RepMetrics {
            rom: 300.0,
            peak_elbow_vel: 2000.0,
            upperarm_sway: 90.0,
            swing_ratio: 0.3,
            jerk_p95: 1e6,
        };
        assert_eq!(policy.assess(&wild, RepTiming::default()), None);
    }

    #[test]
    fn test_issue_cues() {
        let r = RepResult::with_issue(RepMetrics::default(), Some(FormIssue::Swinging));
        assert_eq!(r.coach_cue, Some("Keep upper arm still"));
        assert_eq!(FormIssue::PartialRom.coach_cue(), "Curl higher");
        assert_eq!(FormIssue::TooFast.as_str(), "too_fast");
    }
}
