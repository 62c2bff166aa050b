//! The streaming evaluator façade.
//!
//! [`Evaluator`] owns every piece of per-session state and runs one packet at
//! a time through:
//!
//! 1. calibration sampling (raw readings)
//! 2. timing reconstruction from the sequence counter
//! 3. offset removal and unwrap per channel
//! 4. the angle -> velocity -> jerk filter chain
//! 5. rep buffering, when a rep is open
//!
//! Rep boundaries come from outside via [`Evaluator::start_rep`] and
//! [`Evaluator::end_rep`]; see [`crate::session`] for the stock boundary rule.
//!
//! # Example
//!
//! ```
//! use rep_quality::{Evaluator, Packet};
//!
//! let mut ev = Evaluator::new();
//! ev.start_rep();
//! for i in 0..50u16 {
//!     ev.update(&Packet::new(i, f64::from(i) * 2.0, 0.0));
//! }
//! let result = ev.end_rep(1.2, 5.0);
//! assert!(result.metrics.rom > 0.0);
//! assert!(result.issue.is_none());
//! ```

use tracing::debug;

use crate::angle::AngleReconstructor;
use crate::calibration::{CalibrationManager, Offsets};
use crate::config::EvaluatorConfig;
use crate::error::Result;
use crate::filter::FilterChain;
use crate::metrics::{aggregate, FormChecksDisabled, FormPolicy, RepResult, RepTiming};
use crate::packet::{Packet, Snapshot};
use crate::segment::{RepBuffer, RepSegmenter};
use crate::timing::TimingReconstructor;

/// Streaming rep-quality evaluator for one live session.
///
/// Feed packets from a single producer, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator<P = FormChecksDisabled> {
    config: EvaluatorConfig,
    timing: TimingReconstructor,
    calibration: CalibrationManager,
    elbow_angle: AngleReconstructor,
    upper_arm_angle: AngleReconstructor,
    filters: FilterChain,
    segmenter: RepSegmenter,
    policy: P,
}

impl Evaluator {
    /// Evaluator with the default configuration and form checks disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(EvaluatorConfig::default(), FormChecksDisabled)
    }

    /// Evaluator with a custom configuration and form checks disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_config(config: EvaluatorConfig) -> Result<Self> {
        Self::with_policy(config, FormChecksDisabled)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FormPolicy> Evaluator<P> {
    /// Evaluator with a custom configuration and form policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_policy(config: EvaluatorConfig, policy: P) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, policy))
    }

    fn from_parts(config: EvaluatorConfig, policy: P) -> Self {
        Self {
            timing: TimingReconstructor::new(&config),
            calibration: CalibrationManager::new(&config),
            elbow_angle: AngleReconstructor::new(),
            upper_arm_angle: AngleReconstructor::new(),
            filters: FilterChain::new(&config),
            segmenter: RepSegmenter::new(),
            policy,
            config,
        }
    }

    /// Reinitialize all state, as if freshly constructed.
    ///
    /// Call at session start and whenever the transport disconnects.
    pub fn reset(&mut self) {
        debug!("evaluator reset");
        self.timing = TimingReconstructor::new(&self.config);
        self.calibration = CalibrationManager::new(&self.config);
        self.elbow_angle.reset();
        self.upper_arm_angle.reset();
        self.filters = FilterChain::new(&self.config);
        self.segmenter = RepSegmenter::new();
        self.policy.reset();
    }

    /// Begin collecting samples for a manual calibration.
    pub fn calibrate_start(&mut self) {
        self.calibration.start_manual();
    }

    /// Commit the mean of the samples collected since [`Self::calibrate_start`].
    ///
    /// An empty collection leaves offsets unchanged.
    pub fn calibrate_finish(&mut self) {
        self.calibration.finish_manual();
    }

    /// Open a repetition. Replaces any rep already open.
    pub fn start_rep(&mut self) {
        self.segmenter.start();
    }

    /// Close the open repetition and compute its metrics.
    ///
    /// Never fails: with no rep open the result is all zeros with no issue.
    pub fn end_rep(&mut self, rep_time_s: f64, session_time_s: f64) -> RepResult {
        let Some(buffer) = self.segmenter.finish() else {
            return RepResult::empty();
        };

        let metrics = aggregate(&buffer, &self.config);
        let issue = self.policy.assess(
            &metrics,
            RepTiming {
                rep_time_s,
                session_time_s,
            },
        );
        debug!(
            samples = buffer.len(),
            rom = metrics.rom,
            peak_elbow_vel = metrics.peak_elbow_vel,
            swing_ratio = metrics.swing_ratio,
            jerk_p95 = metrics.jerk_p95,
            ?issue,
            "rep closed"
        );
        RepResult::with_issue(metrics, issue)
    }

    /// Process one packet and return the smoothed state.
    pub fn update(&mut self, packet: &Packet) -> Snapshot {
        self.calibration
            .observe(packet.elbow_angle_proxy, packet.upper_arm_pitch);

        let dt = self.timing.advance(packet.seq);
        let offsets = self.calibration.offsets();
        let elbow = self
            .elbow_angle
            .reconstruct(packet.elbow_angle_proxy, offsets.elbow);
        let upper_arm = self
            .upper_arm_angle
            .reconstruct(packet.upper_arm_pitch, offsets.upper_arm);

        let (elbow, upper_arm) = self.filters.update(elbow, upper_arm, dt);
        self.segmenter.record(&elbow, &upper_arm);

        Snapshot {
            elbow_angle: elbow.angle,
            elbow_vel: elbow.velocity,
            upperarm_angle: upper_arm.angle,
            upperarm_vel: upper_arm.velocity,
        }
    }

    /// Current smoothed state without processing a packet.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let elbow = self.filters.elbow.estimate();
        let upper_arm = self.filters.upper_arm.estimate();
        Snapshot {
            elbow_angle: elbow.angle,
            elbow_vel: elbow.velocity,
            upperarm_angle: upper_arm.angle,
            upperarm_vel: upper_arm.velocity,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Calibration offsets currently applied.
    #[must_use]
    pub const fn offsets(&self) -> Offsets {
        self.calibration.offsets()
    }

    /// Calibration state.
    #[must_use]
    pub const fn calibration(&self) -> &CalibrationManager {
        &self.calibration
    }

    /// Whether offsets have been committed.
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibration.is_committed()
    }

    /// Whether a repetition is open.
    #[must_use]
    pub const fn is_rep_active(&self) -> bool {
        self.segmenter.is_active()
    }

    /// Samples collected so far for the open repetition.
    #[must_use]
    pub const fn rep_buffer(&self) -> Option<&RepBuffer> {
        self.segmenter.current()
    }

    /// Time step used for the last packet (seconds).
    #[must_use]
    pub const fn last_dt(&self) -> f64 {
        self.timing.last_dt()
    }

    /// Form policy.
    #[must_use]
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable form policy, for tuning thresholds mid-session.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{FormIssue, RepMetrics};
    use approx::assert_relative_eq;

    #[test]
    fn test_cold_start_snapshot() {
        let mut ev = Evaluator::new();
        let s = ev.update(&Packet::new(0, 10.0, 2.0));
        assert_eq!(s.elbow_angle, Some(10.0));
        assert_eq!(s.upperarm_angle, Some(2.0));
        assert_eq!(s.elbow_vel, None);
        assert_eq!(s.upperarm_vel, None);

        let s = ev.update(&Packet::new(1, 20.0, 2.0));
        assert_relative_eq!(s.elbow_angle.unwrap(), 12.0);
        assert_relative_eq!(s.elbow_vel.unwrap(), 100.0);
        assert_relative_eq!(s.upperarm_vel.unwrap(), 0.0);
        assert_eq!(ev.snapshot(), s);
    }

    #[test]
    fn test_empty_packets_stay_undefined() {
        let mut ev = Evaluator::new();
        for _ in 0..5 {
            assert_eq!(ev.update(&Packet::default()), Snapshot::default());
        }
    }

    #[test]
    fn test_end_rep_while_idle() {
        let mut ev = Evaluator::new();
        let r = ev.end_rep(1.0, 10.0);
        assert_eq!(r, RepResult::empty());

        ev.start_rep();
        ev.end_rep(1.0, 10.0);
        // Second close is idle again
        assert_eq!(ev.end_rep(1.0, 10.0), RepResult::empty());
    }

    #[test]
    fn test_rep_before_any_data_is_zero() {
        let mut ev = Evaluator::new();
        ev.start_rep();
        let r = ev.end_rep(0.5, 0.5);
        assert_eq!(r.metrics, RepMetrics::default());
    }

    #[test]
    fn test_auto_calibration_applies_offsets() {
        let mut ev = Evaluator::new();
        for i in 0..49u16 {
            ev.update(&Packet::new(i, 20.0, 5.0));
        }
        assert!(!ev.is_calibrated());
        assert_eq!(ev.offsets(), Offsets::default());

        ev.update(&Packet::new(49, 20.0, 5.0));
        assert!(ev.is_calibrated());
        assert_relative_eq!(ev.offsets().elbow, 20.0);
        assert_relative_eq!(ev.offsets().upper_arm, 5.0);
    }

    #[test]
    fn test_manual_calibration_through_facade() {
        let mut ev = Evaluator::new();
        ev.calibrate_start();
        ev.update(&Packet::new(0, 10.0, 1.0));
        ev.update(&Packet::new(1, 14.0, 3.0));
        ev.calibrate_finish();
        assert_relative_eq!(ev.offsets().elbow, 12.0);
        assert_relative_eq!(ev.offsets().upper_arm, 2.0);
    }

    #[test]
    fn test_filter_state_persists_across_reps() {
        let mut ev = Evaluator::new();
        for i in 0..10u16 {
            ev.update(&Packet::new(i, f64::from(i), 0.0));
        }
        ev.start_rep();
        let s = ev.update(&Packet::new(10, 10.0, 0.0));
        let r = ev.end_rep(0.02, 0.2);
        // Velocity was already defined on the rep's first sample
        assert!(s.elbow_vel.is_some());
        assert_relative_eq!(r.metrics.peak_elbow_vel, s.elbow_vel.unwrap().abs());
        assert_eq!(r.metrics.rom, 0.0);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let mut ev = Evaluator::new();
        ev.calibrate_start();
        for i in 0..80u16 {
            ev.update(&Packet::new(i.wrapping_mul(900), f64::from(i) * 4.0, 1.0));
        }
        ev.calibrate_finish();
        ev.start_rep();
        ev.update(&Packet::new(3, 33.0, 2.0));

        ev.reset();
        assert_eq!(ev, Evaluator::new());
    }

    #[test]
    fn test_reset_keeps_config() {
        let config = EvaluatorConfig::wrist_imu();
        let mut ev = Evaluator::with_config(config.clone()).unwrap();
        ev.update(&Packet::new(0, 1.0, 1.0));
        ev.reset();
        assert_eq!(ev.config(), &config);
        assert_eq!(ev, Evaluator::with_config(config).unwrap());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EvaluatorConfig::default().with_alpha(0.0);
        assert!(Evaluator::with_config(config).is_err());
    }

    #[test]
    fn test_last_dt_tracks_sequence_gaps() {
        let mut ev = Evaluator::new();
        ev.update(&Packet::new(65535, 0.0, 0.0));
        ev.update(&Packet::new(2, 0.0, 0.0));
        assert_relative_eq!(ev.last_dt(), 0.06);
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct SwingPolicy {
        threshold: f64,
        assessed: usize,
    }

    impl FormPolicy for SwingPolicy {
        fn assess(&mut self, metrics: &RepMetrics, timing: RepTiming) -> Option<FormIssue> {
            self.assessed += 1;
            if timing.rep_time_s < 0.3 {
                return Some(FormIssue::TooFast);
            }
            (metrics.swing_ratio > self.threshold).then_some(FormIssue::Swinging)
        }

        fn reset(&mut self) {
            self.assessed = 0;
        }
    }

    #[test]
    fn test_custom_policy_hook() {
        let policy = SwingPolicy {
            threshold: 0.1,
            assessed: 0,
        };
        let mut ev = Evaluator::with_policy(
            EvaluatorConfig::default().with_auto_calibration(false),
            policy,
        )
        .unwrap();

        ev.start_rep();
        for i in 0..20u16 {
            let t = f64::from(i);
            ev.update(&Packet::new(i, t * 5.0, t * 2.0));
        }
        let r = ev.end_rep(1.5, 12.0);
        assert_eq!(r.issue, Some(FormIssue::Swinging));
        assert_eq!(r.coach_cue, Some("Keep upper arm still"));

        ev.start_rep();
        ev.update(&Packet::new(20, 100.0, 40.0));
        let r = ev.end_rep(0.1, 12.2);
        assert_eq!(r.issue, Some(FormIssue::TooFast));
        assert_eq!(ev.policy().assessed, 2);

        // Idle close does not consult the policy
        ev.end_rep(1.0, 13.0);
        assert_eq!(ev.policy().assessed, 2);

        ev.reset();
        assert_eq!(ev.policy().assessed, 0);
        assert_relative_eq!(ev.policy().threshold, 0.1);
    }
}
