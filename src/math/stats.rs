//! Reductions over per-rep sample buffers.
//!
//! Every function is total: an empty slice reduces to `0.0`.

/// `max - min` of the samples.
#[must_use]
pub fn range(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Largest absolute value.
#[must_use]
pub fn peak_abs(values: &[f64]) -> f64 {
    values.iter().map(|v| v.abs()).fold(0.0, f64::max)
}

/// Nearest-rank percentile.
///
/// Sorts ascending and returns the element at `floor(p / 100 * (n - 1))`,
/// clamped into the slice. `p` is in percent.
///
/// # Example
///
/// ```
/// use rep_quality::math::percentile_nearest_rank;
///
/// let v = [5.0, 1.0, 4.0, 2.0, 3.0];
/// assert_eq!(percentile_nearest_rank(&v, 50.0), 3.0);
/// // floor(0.95 * 4) = 3
/// assert_eq!(percentile_nearest_rank(&v, 95.0), 4.0);
/// ```
#[must_use]
pub fn percentile_nearest_rank(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() - 1;
    let rank = (p / 100.0 * last as f64).floor();
    let idx = if rank <= 0.0 {
        0
    } else {
        (rank as usize).min(last)
    };
    sorted[idx]
}
