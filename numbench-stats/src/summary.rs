//! Summary Statistics
//!
//! Mean, median, extremes and sample standard deviation over a timing sample set.
//! An empty sample set yields NaN for every statistic instead of an error.

use crate::percentiles::compute_percentile;
use serde::{Deserialize, Serialize};

/// Summary of one timing sample set (values in seconds)
///
/// Location statistics are NaN for an empty set; `std_dev` is 0 below two samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Median (50th percentile, interpolated)
    pub median: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Sample standard deviation, 0 with fewer than two samples
    pub std_dev: f64,
    /// Number of samples summarized
    pub sample_count: usize,
}

impl SummaryStatistics {
    /// Summary of an empty sample set
    pub fn empty() -> Self {
        Self {
            mean: f64::NAN,
            median: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            std_dev: 0.0,
            sample_count: 0,
        }
    }

    /// Whether no samples were collected
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Compute summary statistics over all samples
pub fn compute_summary(samples: &[f64]) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::empty();
    }

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let median = compute_percentile(samples, 50.0);

    let std_dev = if n < 2 {
        0.0
    } else {
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    };

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    SummaryStatistics {
        mean,
        median,
        min,
        max,
        std_dev,
        sample_count: n,
    }
}
