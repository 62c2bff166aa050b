//! Baseline offset estimation.
//!
//! Two strategies share one state machine ([`CalibrationStrategy`]):
//!
//! - **Automatic** (armed by default): passively averages the first
//!   `ceil(sample_rate_hz)` samples with both channels finite, then commits.
//! - **Manual**: averages every finite sample pair between
//!   [`CalibrationManager::start_manual`] and
//!   [`CalibrationManager::finish_manual`]. Starting a manual calibration
//!   disarms the automatic one for good, even if nothing ends up committed.
//!
//! At most one commit happens per lifetime; a fresh manager is needed to
//! calibrate again.

use tracing::{debug, warn};

use crate::config::EvaluatorConfig;

/// Offsets subtracted from the raw channels before unwrapping (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offsets {
    /// Elbow-angle proxy offset.
    pub elbow: f64,
    /// Upper-arm pitch offset.
    pub upper_arm: f64,
}

/// Which strategy produced the committed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationSource {
    /// Explicit start/finish averaging.
    Manual,
    /// Passive first-second averaging.
    Automatic,
}

/// Running per-channel sums of raw sample pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OffsetAccumulator {
    elbow_sum: f64,
    upper_arm_sum: f64,
    count: usize,
}

impl OffsetAccumulator {
    /// Add one raw sample pair.
    pub fn push(&mut self, elbow: f64, upper_arm: f64) {
        self.elbow_sum += elbow;
        self.upper_arm_sum += upper_arm;
        self.count += 1;
    }

    /// Number of pairs accumulated.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether no pair has been accumulated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Per-channel arithmetic mean, `None` when empty.
    #[must_use]
    pub fn mean(&self) -> Option<Offsets> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Offsets {
            elbow: self.elbow_sum / n,
            upper_arm: self.upper_arm_sum / n,
        })
    }
}

/// Calibration state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStrategy {
    /// Passively averaging until `target` pairs are seen.
    Automatic {
        accumulator: OffsetAccumulator,
        target: usize,
    },
    /// Averaging between explicit start and finish.
    Manual { accumulator: OffsetAccumulator },
    /// Nothing armed and nothing committed.
    Idle,
    /// Offsets committed; no further calibration.
    Committed { source: CalibrationSource },
}

/// Owns the offsets and the strategy that produces them.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationManager {
    strategy: CalibrationStrategy,
    offsets: Offsets,
}

impl CalibrationManager {
    /// Create a manager with zero offsets, automatic calibration armed if
    /// the configuration asks for it.
    #[must_use]
    pub fn new(config: &EvaluatorConfig) -> Self {
        let strategy = if config.auto_calibration {
            CalibrationStrategy::Automatic {
                accumulator: OffsetAccumulator::default(),
                target: config.auto_calibration_samples(),
            }
        } else {
            CalibrationStrategy::Idle
        };
        Self {
            strategy,
            offsets: Offsets::default(),
        }
    }

    /// Feed one packet's raw readings.
    ///
    /// Only pairs with both channels finite are collected. Returns the source
    /// when this sample completed an automatic calibration.
    pub fn observe(
        &mut self,
        elbow_raw: Option<f64>,
        upper_arm_raw: Option<f64>,
    ) -> Option<CalibrationSource> {
        let (elbow, upper_arm) = match (elbow_raw, upper_arm_raw) {
            (Some(e), Some(u)) if e.is_finite() && u.is_finite() => (e, u),
            _ => return None,
        };

        match &mut self.strategy {
            CalibrationStrategy::Manual { accumulator } => {
                accumulator.push(elbow, upper_arm);
                None
            }
            CalibrationStrategy::Automatic {
                accumulator,
                target,
            } => {
                accumulator.push(elbow, upper_arm);
                if accumulator.len() < *target {
                    return None;
                }
                let mean = accumulator.mean()?;
                self.commit(mean, CalibrationSource::Automatic);
                Some(CalibrationSource::Automatic)
            }
            CalibrationStrategy::Idle | CalibrationStrategy::Committed { .. } => None,
        }
    }

    /// Begin (or restart) manual sample collection.
    ///
    /// Disarms automatic calibration. Ignored once offsets are committed.
    pub fn start_manual(&mut self) {
        if let CalibrationStrategy::Committed { source } = self.strategy {
            warn!(?source, "calibration already committed, ignoring manual start");
            return;
        }
        debug!("manual calibration started");
        self.strategy = CalibrationStrategy::Manual {
            accumulator: OffsetAccumulator::default(),
        };
    }

    /// Finish manual collection, committing the mean if any pair was seen.
    ///
    /// With an empty collection the offsets stay as they are, but automatic
    /// calibration remains disarmed. Returns whether a commit happened.
    pub fn finish_manual(&mut self) -> bool {
        let CalibrationStrategy::Manual { accumulator } = &self.strategy else {
            debug!("manual calibration finish without start, ignoring");
            return false;
        };

        match accumulator.mean() {
            Some(mean) => {
                self.commit(mean, CalibrationSource::Manual);
                true
            }
            None => {
                debug!("manual calibration finished with no samples");
                self.strategy = CalibrationStrategy::Idle;
                false
            }
        }
    }

    fn commit(&mut self, offsets: Offsets, source: CalibrationSource) {
        debug!(
            ?source,
            elbow = offsets.elbow,
            upper_arm = offsets.upper_arm,
            "calibration committed"
        );
        self.offsets = offsets;
        self.strategy = CalibrationStrategy::Committed { source };
    }

    /// Current offsets (zero until a commit).
    #[must_use]
    pub const fn offsets(&self) -> Offsets {
        self.offsets
    }

    /// Current strategy state.
    #[must_use]
    pub const fn strategy(&self) -> &CalibrationStrategy {
        &self.strategy
    }

    /// Whether offsets have been committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self.strategy, CalibrationStrategy::Committed { .. })
    }

    /// Whether a manual collection is in progress.
    #[must_use]
    pub const fn is_manual_in_progress(&self) -> bool {
        matches!(self.strategy, CalibrationStrategy::Manual { .. })
    }
}
