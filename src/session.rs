//! Live curl session: rep boundary detection around the evaluator.
//!
//! The evaluator records whatever interval it is told to. This module
//! supplies the boundary rule the coaching app uses: a rep opens when the
//! smoothed elbow velocity turns clearly positive and closes at the top of
//! the curl, when the remembered velocity sign flips from positive to
//! negative. Velocities inside a small deadband count as "no direction" and
//! do not overwrite the remembered sign.
//!
//! # Example
//!
//! ```
//! use rep_quality::{CurlSession, Packet};
//!
//! let mut session = CurlSession::new();
//! let mut seq = 0u16;
//! let mut feed = |session: &mut CurlSession, angle: f64| {
//!     seq = seq.wrapping_add(1);
//!     session.process(&Packet::new(seq, angle, 0.0))
//! };
//!
//! for _ in 0..60 {
//!     feed(&mut session, 0.0);
//! }
//! let mut completed = Vec::new();
//! for i in 0..90 {
//!     let base = if i < 45 { f64::from(i) / 45.0 } else { f64::from(90 - i) / 45.0 };
//!     completed.extend(feed(&mut session, 120.0 * base).completed);
//! }
//! assert_eq!(completed.len(), 1);
//! assert_eq!(session.rep_count(), 1);
//! ```

use tracing::debug;

use crate::config::EvaluatorConfig;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::frame::ImuFrame;
use crate::metrics::{FormChecksDisabled, FormPolicy, RepResult};
use crate::packet::{Packet, Snapshot};

/// Default velocity deadband (degrees/s).
pub const DEFAULT_DEADBAND_DEG_S: f64 = 1.0;

/// Encouragement rotated through on clean reps.
pub const POSITIVE_CUES: [&str; 4] = ["Good form", "Keep it up", "Nice rep", "Solid tempo"];

/// Direction of elbow motion, with a deadband.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Flexing (angle increasing).
    Up,
    /// Extending (angle decreasing).
    Down,
    /// Undefined or inside the deadband.
    Still,
}

impl Direction {
    /// Classify a velocity.
    #[must_use]
    pub fn of(velocity: Option<f64>, deadband: f64) -> Self {
        match velocity {
            Some(v) if v.is_finite() && v.abs() >= deadband => {
                if v > 0.0 {
                    Self::Up
                } else {
                    Self::Down
                }
            }
            _ => Self::Still,
        }
    }
}

/// Rep boundary emitted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepBoundary {
    /// Open a rep.
    Start,
    /// Close the open rep.
    End,
}

/// Velocity-sign rep boundary rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RepDetector {
    deadband: f64,
    last_direction: Option<Direction>,
    active: bool,
}

impl RepDetector {
    /// Detector with the given deadband (degrees/s).
    #[must_use]
    pub const fn new(deadband: f64) -> Self {
        Self {
            deadband,
            last_direction: None,
            active: false,
        }
    }

    /// Feed the latest smoothed elbow velocity.
    pub fn observe(&mut self, elbow_vel: Option<f64>) -> Option<RepBoundary> {
        let direction = Direction::of(elbow_vel, self.deadband);
        let previous = self.last_direction;
        if direction != Direction::Still {
            self.last_direction = Some(direction);
        }

        match direction {
            Direction::Up if !self.active => {
                self.active = true;
                Some(RepBoundary::Start)
            }
            Direction::Down if self.active && previous == Some(Direction::Up) => {
                self.active = false;
                Some(RepBoundary::End)
            }
            _ => None,
        }
    }

    /// Whether a rep is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Forget direction history and close any rep.
    pub fn reset(&mut self) {
        self.last_direction = None;
        self.active = false;
    }
}

impl Default for RepDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DEADBAND_DEG_S)
    }
}

/// Tone of a coaching cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueTone {
    /// Encouragement.
    Positive,
    /// Form correction.
    Alert,
}

/// Cue shown to the athlete after a rep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoachCue {
    /// Text to display.
    pub text: &'static str,
    /// Presentation tone.
    pub tone: CueTone,
}

impl CoachCue {
    /// Cue for a rep: the issue's correction if flagged, otherwise a
    /// rotating encouragement keyed by the rep number.
    #[must_use]
    pub fn for_rep(rep_number: u32, result: &RepResult) -> Self {
        match (result.issue, result.coach_cue) {
            (Some(issue), text) => Self {
                text: text.unwrap_or_else(|| issue.coach_cue()),
                tone: CueTone::Alert,
            },
            (None, _) => Self {
                text: POSITIVE_CUES[rep_number as usize % POSITIVE_CUES.len()],
                tone: CueTone::Positive,
            },
        }
    }
}

/// A rep closed by the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedRep {
    /// 1-based rep number within the session.
    pub rep_number: u32,
    /// Rep duration (seconds of reconstructed stream time).
    pub rep_time_s: f64,
    /// Evaluator output.
    pub result: RepResult,
    /// Cue for the athlete.
    pub cue: CoachCue,
}

/// Outcome of one processed packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionUpdate {
    /// Smoothed state after the packet.
    pub snapshot: Snapshot,
    /// Rep closed by this packet, if any.
    pub completed: Option<CompletedRep>,
}

/// Evaluator plus boundary detection, rep counting and session time.
///
/// Session time is the sum of reconstructed packet intervals, so it pauses
/// with the stream and widens across dropped packets.
#[derive(Debug, Clone, PartialEq)]
pub struct CurlSession<P = FormChecksDisabled> {
    evaluator: Evaluator<P>,
    detector: RepDetector,
    session_time_s: f64,
    rep_started_at_s: f64,
    rep_count: u32,
}

impl CurlSession {
    /// Session with default evaluator and detector.
    #[must_use]
    pub fn new() -> Self {
        Self::with_evaluator(Evaluator::new(), RepDetector::default())
    }

    /// Session with a custom evaluator configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_config(config: EvaluatorConfig) -> Result<Self> {
        Ok(Self::with_evaluator(
            Evaluator::with_config(config)?,
            RepDetector::default(),
        ))
    }
}

impl Default for CurlSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FormPolicy> CurlSession<P> {
    /// Session around an existing evaluator and detector.
    #[must_use]
    pub const fn with_evaluator(evaluator: Evaluator<P>, detector: RepDetector) -> Self {
        Self {
            evaluator,
            detector,
            session_time_s: 0.0,
            rep_started_at_s: 0.0,
            rep_count: 0,
        }
    }

    /// Process one packet.
    pub fn process(&mut self, packet: &Packet) -> SessionUpdate {
        let snapshot = self.evaluator.update(packet);
        self.session_time_s += self.evaluator.last_dt();

        let completed = match self.detector.observe(snapshot.elbow_vel) {
            Some(RepBoundary::Start) => {
                self.evaluator.start_rep();
                self.rep_started_at_s = self.session_time_s;
                None
            }
            Some(RepBoundary::End) => Some(self.complete_rep()),
            None => None,
        };

        SessionUpdate {
            snapshot,
            completed,
        }
    }

    /// Decode and process one raw sensor notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification is not a full frame.
    pub fn process_frame(&mut self, bytes: &[u8]) -> Result<SessionUpdate> {
        let frame = ImuFrame::decode(bytes)?;
        Ok(self.process(&frame.to_packet()))
    }

    /// Decode and process one bridge JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid packet.
    #[cfg(feature = "serde")]
    pub fn process_json(&mut self, payload: &str) -> Result<SessionUpdate> {
        let packet = Packet::from_json(payload)?;
        Ok(self.process(&packet))
    }

    fn complete_rep(&mut self) -> CompletedRep {
        let rep_time_s = self.session_time_s - self.rep_started_at_s;
        let result = self.evaluator.end_rep(rep_time_s, self.session_time_s);
        self.rep_count += 1;
        let cue = CoachCue::for_rep(self.rep_count, &result);
        debug!(
            rep = self.rep_count,
            rep_time_s,
            rom = result.metrics.rom,
            cue = cue.text,
            "rep completed"
        );
        CompletedRep {
            rep_number: self.rep_count,
            rep_time_s,
            result,
            cue,
        }
    }

    /// Reset everything: new set, or transport disconnect.
    pub fn reset(&mut self) {
        self.evaluator.reset();
        self.detector.reset();
        self.session_time_s = 0.0;
        self.rep_started_at_s = 0.0;
        self.rep_count = 0;
    }

    /// Completed reps so far.
    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Reconstructed stream time (seconds).
    #[must_use]
    pub const fn session_time_s(&self) -> f64 {
        self.session_time_s
    }

    /// Underlying evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator<P> {
        &self.evaluator
    }

    /// Mutable evaluator, e.g. to run a manual calibration.
    pub fn evaluator_mut(&mut self) -> &mut Evaluator<P> {
        &mut self.evaluator
    }
}
