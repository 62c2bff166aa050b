//! Rep Quality
//!
//! Streaming motion-quality evaluation for weighted elbow-flexion exercises
//! (bicep curls) from a dual-IMU joint-angle stream.
//!
//! Each packet carries a wrapping sequence counter, an elbow angle proxy and
//! the upper-arm pitch. The [`Evaluator`] reconstructs timing from the
//! counter, removes a calibrated baseline, unwraps the circular angles,
//! smooths them into angle / velocity / jerk estimates and, between
//! externally signalled rep boundaries, buffers the smoothed values so each
//! closed rep reduces to a handful of quality metrics.
//!
//! # Features
//!
//! - **Wraparound-safe timing**: `dt` from 16-bit sequence distance, clamped
//! - **Continuous angles**: offset removal plus half-turn unwrap
//! - **Cascaded smoothing**: one-pole filters for angle, velocity and jerk
//! - **Dual calibration**: manual start/finish or passive first-second average
//! - **Rep metrics**: ROM, peak velocity, sway, swing ratio, jerk p95
//! - **Pluggable form checks**: [`FormPolicy`] hook, disabled by default
//!
//! # Quick Start
//!
//! ```
//! use rep_quality::{Evaluator, Packet};
//!
//! let mut ev = Evaluator::new();
//!
//! // One second of rest lets automatic calibration settle the baseline.
//! for seq in 0..50u16 {
//!     ev.update(&Packet::new(seq, 0.0, 0.0));
//! }
//!
//! ev.start_rep();
//! for i in 0..40u16 {
//!     let snapshot = ev.update(&Packet::new(50 + i, f64::from(i) * 3.0, 0.5));
//!     assert!(snapshot.elbow_angle.is_some());
//! }
//! let result = ev.end_rep(0.8, 1.8);
//!
//! assert!(result.metrics.rom > 90.0);
//! assert!(result.metrics.swing_ratio < 0.01);
//! assert!(result.issue.is_none());
//! ```
//!
//! # Metrics
//!
//! | Field | Units | Meaning |
//! |-------|-------|---------|
//! | `rom` | deg | elbow max - min |
//! | `peak_elbow_vel` | deg/s | max \|elbow velocity\| |
//! | `upperarm_sway` | deg | upper-arm max - min |
//! | `swing_ratio` | - | sway / ROM |
//! | `jerk_p95` | deg/s^3 | 95th percentile \|jerk\| |

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod angle;
pub mod calibration;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod frame;
pub mod math;
pub mod metrics;
pub mod packet;
pub mod segment;
pub mod session;
pub mod timing;

// Re-exports for convenient access
pub use angle::AngleReconstructor;
pub use calibration::{
    CalibrationManager, CalibrationSource, CalibrationStrategy, OffsetAccumulator, Offsets,
};
pub use config::EvaluatorConfig;
pub use error::{EvaluatorError, Result};
pub use evaluator::Evaluator;
pub use filter::{ChannelEstimate, ChannelFilter, FilterChain};
pub use frame::ImuFrame;
pub use metrics::{
    aggregate, FormChecksDisabled, FormIssue, FormPolicy, RepMetrics, RepResult, RepTiming,
};
pub use packet::{Packet, Snapshot};
pub use segment::{RepBuffer, RepSegmenter};
pub use session::{
    CoachCue, CompletedRep, CueTone, CurlSession, Direction, RepBoundary, RepDetector,
    SessionUpdate,
};
pub use timing::{sequence_distance, TimingReconstructor};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
