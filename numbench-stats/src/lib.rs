#![warn(missing_docs)]
//! NumBench Statistics
//!
//! Summarizes the wall-clock samples collected for one (implementation, input) pair:
//! - Mean, median, min, max over all samples
//! - Sample standard deviation (Bessel-corrected, 0 below two samples)
//! - Linear-interpolated percentiles (the median uses the 50th)
//!
//! No outlier rejection is applied. Every sample counts.

mod percentiles;
mod summary;

pub use percentiles::compute_percentile;
pub use summary::{SummaryStatistics, compute_summary};
