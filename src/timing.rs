//! Inter-sample time reconstruction from a wrapping sequence counter.
//!
//! The sensor stamps each packet with a 16-bit counter instead of a clock.
//! The forward distance between consecutive counters, times the nominal
//! sample period, gives the elapsed time, so dropped packets widen `dt`
//! instead of inflating derivatives. The result is clamped so a long gap or
//! a duplicated counter never produces a degenerate time step.

use tracing::trace;

use crate::config::EvaluatorConfig;

/// Counter modulus of the 16-bit sequence number.
pub const SEQ_MODULUS: u32 = 1 << 16;

/// Forward distance from `last` to `seq` across wraparound.
///
/// A distance of zero (repeated counter) is reported as one so time always
/// moves forward.
///
/// # Example
///
/// ```
/// use rep_quality::timing::sequence_distance;
///
/// assert_eq!(sequence_distance(65535, 2), 3);
/// assert_eq!(sequence_distance(10, 10), 1);
/// ```
#[inline]
#[must_use]
pub fn sequence_distance(last: u16, seq: u16) -> u32 {
    let distance = (u32::from(seq) + SEQ_MODULUS - u32::from(last)) % SEQ_MODULUS;
    distance.max(1)
}

/// Converts sequence counters into a bounded time step.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingReconstructor {
    nominal_period_s: f64,
    dt_min_s: f64,
    dt_max_s: f64,
    last_seq: Option<u16>,
    last_dt_s: f64,
}

impl TimingReconstructor {
    /// Create a reconstructor from the evaluator configuration.
    #[must_use]
    pub fn new(config: &EvaluatorConfig) -> Self {
        let nominal_period_s = config.nominal_period_s();
        Self {
            nominal_period_s,
            dt_min_s: config.dt_min_s,
            dt_max_s: config.dt_max_s,
            last_seq: None,
            last_dt_s: nominal_period_s.clamp(config.dt_min_s, config.dt_max_s),
        }
    }

    /// Advance by one packet and return its `dt` in seconds.
    ///
    /// A packet without a counter, or the first counter seen, counts as one
    /// nominal period. Packets without a counter do not move the reference.
    pub fn advance(&mut self, seq: Option<u16>) -> f64 {
        let distance = match (self.last_seq, seq) {
            (Some(last), Some(seq)) => sequence_distance(last, seq),
            _ => 1,
        };
        if seq.is_some() {
            self.last_seq = seq;
        }

        let dt = (f64::from(distance) * self.nominal_period_s).clamp(self.dt_min_s, self.dt_max_s);
        if distance > 1 {
            trace!(distance, dt, "sequence gap");
        }
        self.last_dt_s = dt;
        dt
    }

    /// Most recent `dt` (nominal period before any packet).
    #[must_use]
    pub const fn last_dt(&self) -> f64 {
        self.last_dt_s
    }

    /// Most recent sequence counter.
    #[must_use]
    pub const fn last_seq(&self) -> Option<u16> {
        self.last_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn timing() -> TimingReconstructor {
        TimingReconstructor::new(&EvaluatorConfig::default())
    }

    #[test]
    fn test_distance_wraps() {
        assert_eq!(sequence_distance(65535, 2), 3);
        assert_eq!(sequence_distance(65535, 0), 1);
        assert_eq!(sequence_distance(100, 105), 5);
    }

    #[test]
    fn test_zero_distance_is_one() {
        assert_eq!(sequence_distance(0, 0), 1);
        assert_eq!(sequence_distance(4242, 4242), 1);
    }

    #[test]
    fn test_backwards_counter_is_a_long_forward_gap() {
        assert_eq!(sequence_distance(5, 4), 65535);
    }

    #[test]
    fn test_first_packet_is_nominal() {
        let mut t = timing();
        assert_relative_eq!(t.advance(Some(900)), 0.02);
        assert_eq!(t.last_seq(), Some(900));
    }

    #[test]
    fn test_gap_scales_dt() {
        let mut t = timing();
        t.advance(Some(65534));
        // 65534 -> 1 is three periods
        assert_relative_eq!(t.advance(Some(1)), 0.06);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut t = timing();
        t.advance(Some(0));
        assert_relative_eq!(t.advance(Some(50)), 0.1);

        let config = EvaluatorConfig::default().with_sample_rate(5000.0);
        let mut fast = TimingReconstructor::new(&config);
        assert_relative_eq!(fast.advance(Some(1)), 0.001);
    }

    #[test]
    fn test_missing_seq_keeps_reference() {
        let mut t = timing();
        t.advance(Some(10));
        assert_relative_eq!(t.advance(None), 0.02);
        assert_eq!(t.last_seq(), Some(10));
        assert_relative_eq!(t.advance(Some(12)), 0.04);
    }

    #[test]
    fn test_repeated_seq_moves_forward() {
        let mut t = timing();
        t.advance(Some(7));
        assert_relative_eq!(t.advance(Some(7)), 0.02);
        assert_relative_eq!(t.last_dt(), 0.02);
    }
}
