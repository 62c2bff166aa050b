//! Circular angle helpers.
//!
//! Sensors report angles modulo 360°. Unwrapping picks, for every new sample,
//! the representative closest to the previous unwrapped value, which is
//! correct as long as the true motion between two samples stays below half a
//! turn. Larger steps alias silently.

/// Degrees in a full turn.
pub const FULL_TURN_DEG: f64 = 360.0;

/// Degrees in half a turn.
pub const HALF_TURN_DEG: f64 = 180.0;

/// Fold an angular difference into `[-180, 180)` degrees.
///
/// Constant time for any finite input. Non-finite input yields NaN.
///
/// # Example
///
/// ```
/// use rep_quality::math::fold_deg;
///
/// assert_eq!(fold_deg(350.0), -10.0);
/// assert_eq!(fold_deg(180.0), -180.0);
/// assert_eq!(fold_deg(-190.0), 170.0);
/// ```
#[inline]
#[must_use]
pub fn fold_deg(diff: f64) -> f64 {
    let folded = (diff + HALF_TURN_DEG).rem_euclid(FULL_TURN_DEG) - HALF_TURN_DEG;
    // rem_euclid can round up to a full turn for tiny negative remainders
    if folded >= HALF_TURN_DEG {
        folded - FULL_TURN_DEG
    } else {
        folded
    }
}

/// Unwrap `value` against the previous unwrapped value.
///
/// With no previous value the input passes through unchanged.
#[inline]
#[must_use]
pub fn unwrap_deg(value: f64, prev: Option<f64>) -> f64 {
    match prev {
        Some(prev) => prev + fold_deg(value - prev),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fold_range() {
        for i in -2000..2000 {
            let d = f64::from(i) * 0.73;
            let folded = fold_deg(d);
            assert!((-180.0..180.0).contains(&folded), "{d} -> {folded}");
            // Same angle modulo a full turn
            let turns = (d - folded) / FULL_TURN_DEG;
            assert_relative_eq!(turns, turns.round(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fold_huge_differences() {
        for d in [1.0e11, -1.0e11, 1.0e19, -1.0e19, 4.6e18, f64::MAX, -f64::MAX] {
            let folded = fold_deg(d);
            assert!((-180.0..180.0).contains(&folded), "{d} -> {folded}");
        }
        // 1e11 = 277_777_777 turns + 280
        assert_relative_eq!(fold_deg(1.0e11), -80.0, epsilon = 1e-6);
        assert_relative_eq!(fold_deg(1.0e11 + 30.0), -50.0, epsilon = 1e-6);
        assert_relative_eq!(fold_deg(765.0), 45.0);
    }

    #[test]
    fn test_fold_non_finite_is_nan() {
        assert!(fold_deg(f64::INFINITY).is_nan());
        assert!(fold_deg(f64::NAN).is_nan());
    }

    #[test]
    fn test_fold_just_below_half_turn_boundary() {
        assert_eq!(fold_deg(-180.0 - 1e-14), -180.0);
        assert_eq!(fold_deg(180.0 - 1e-13), 180.0 - 1e-13);
    }

    #[test]
    fn test_first_sample_passes_through() {
        assert_eq!(unwrap_deg(275.0, None), 275.0);
    }

    #[test]
    fn test_unwrap_across_boundary() {
        // 179 -> -179 is a +2 degree step, not -358
        assert_relative_eq!(unwrap_deg(-179.0, Some(179.0)), 181.0);
        assert_relative_eq!(unwrap_deg(179.0, Some(-179.0)), -181.0);
        // Already-unwrapped history several turns away
        assert_relative_eq!(unwrap_deg(5.0, Some(725.0)), 725.0);
    }

    #[test]
    fn test_unwrapped_sequence_is_continuous() {
        // A slow rotation sampled modulo 360
        let mut prev: Option<f64> = None;
        let mut outputs = Vec::new();
        for i in 0..2000 {
            let truth = f64::from(i) * 7.5 - 3000.0;
            let wrapped = truth.rem_euclid(360.0) - 180.0;
            let out = unwrap_deg(wrapped, prev);
            outputs.push(out);
            prev = Some(out);
        }
        for w in outputs.windows(2) {
            assert!((w[1] - w[0]).abs() < 180.0);
            assert_relative_eq!(w[1] - w[0], 7.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_half_turn_step_aliases() {
        // Exactly 180 degrees of motion folds to -180: documented limitation
        assert_relative_eq!(unwrap_deg(190.0, Some(10.0)), -170.0);
    }
}
