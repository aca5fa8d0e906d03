//! Percentile Computation
//!
//! Percentiles are computed over the raw samples with linear interpolation
//! between nearest ranks.

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks. Returns NaN for an empty slice.
///
/// # Examples
///
/// ```
/// # use numbench_stats::compute_percentile;
/// let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }

    if samples.len() == 1 {
        return samples[0];
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let p = (percentile / 100.0).clamp(0.0, 1.0);

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}
