//! Numerical building blocks for the evaluator.
//!
//! This module provides:
//! - [`angle`]: circular angle folding and unwrap
//! - [`ema`]: one-pole smoothing and smoothed finite differences
//! - [`stats`]: range, peak and order-statistic reductions

pub mod angle;
pub mod ema;
pub mod stats;

pub use angle::{fold_deg, unwrap_deg};
pub use ema::{Ema, SmoothedDerivative};
pub use stats::{peak_abs, percentile_nearest_rank, range};
