//! Timing Sampler
//!
//! Runs a zero-argument thunk repeatedly and summarizes its wall-clock timings:
//! - Warmup calls run first and are never timed
//! - Up to `repeats` timed calls follow, one sample each
//! - With `min_time` set, sampling stops as soon as the collected samples add
//!   up to at least `min_time` seconds. Zero or a negative value means no
//!   minimum; the config layer rejects negative durations before they get here.
//!
//! A failing call is never retried; its error is returned to the caller.

use crate::measure::Timer;
use numbench_stats::{SummaryStatistics, compute_summary};
use serde::{Deserialize, Serialize};

/// Default number of untimed priming calls
pub const DEFAULT_WARMUPS: u32 = 1;

/// Default maximum number of timed calls
pub const DEFAULT_REPEATS: u32 = 5;

/// Sampling policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Untimed priming calls
    #[serde(default = "default_warmups")]
    pub warmups: u32,
    /// Maximum timed calls
    #[serde(default = "default_repeats")]
    pub repeats: u32,
    /// Stop once the collected samples total at least this many seconds
    ///
    /// Values `<= 0` disable the early stop.
    #[serde(default)]
    pub min_time: Option<f64>,
}

fn default_warmups() -> u32 {
    DEFAULT_WARMUPS
}

fn default_repeats() -> u32 {
    DEFAULT_REPEATS
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            warmups: DEFAULT_WARMUPS,
            repeats: DEFAULT_REPEATS,
            min_time: None,
        }
    }
}

/// Timings collected for one thunk
#[derive(Debug, Clone)]
pub struct SampledTiming<T> {
    /// Raw samples in seconds, in call order
    pub samples: Vec<f64>,
    /// Statistics over `samples`
    pub summary: SummaryStatistics,
    /// Output of the last call (warmup or timed), if any call ran
    pub output: Option<T>,
}

/// Runs the warmup and measurement phases for a thunk
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    config: SamplerConfig,
}

impl Sampler {
    /// Create a sampler with the given policy
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Sample `f`: warmup, then timed calls until `repeats` or `min_time` is reached.
    ///
    /// Only the call itself is inside the timed region; storing the output
    /// (and dropping the previous one) happens after the timer stops.
    pub fn sample<T, E, F>(&self, mut f: F) -> Result<SampledTiming<T>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let mut output = None;

        for _ in 0..self.config.warmups {
            output = Some(f()?);
        }

        let min_time = self.config.min_time.filter(|t| *t > 0.0);
        let mut samples = Vec::with_capacity(self.config.repeats as usize);
        let mut total = 0.0;

        for _ in 0..self.config.repeats {
            let timer = Timer::start();
            let result = std::hint::black_box(f());
            let elapsed = timer.stop_secs();

            output = Some(result?);
            samples.push(elapsed);
            total += elapsed;

            if min_time.is_some_and(|min| total >= min) {
                break;
            }
        }

        let summary = compute_summary(&samples);

        Ok(SampledTiming {
            samples,
            summary,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    fn config(warmups: u32, repeats: u32, min_time: Option<f64>) -> SamplerConfig {
        SamplerConfig {
            warmups,
            repeats,
            min_time,
        }
    }

    #[test]
    fn test_exact_repeat_count() {
        let sampler = Sampler::new(config(0, 5, None));
        let result = sampler.sample(|| Ok::<_, ()>(42)).unwrap();

        assert_eq!(result.samples.len(), 5);
        assert_eq!(result.summary.sample_count, 5);
        assert_eq!(result.output, Some(42));
    }

    #[test]
    fn test_warmups_are_not_sampled() {
        let calls = Cell::new(0u32);
        let sampler = Sampler::new(config(3, 4, None));
        let result = sampler
            .sample(|| {
                calls.set(calls.get() + 1);
                Ok::<_, ()>(calls.get())
            })
            .unwrap();

        assert_eq!(calls.get(), 7);
        assert_eq!(result.samples.len(), 4);
        assert_eq!(result.output, Some(7));
    }

    #[test]
    fn test_min_time_stops_early() {
        let sampler = Sampler::new(config(0, 10, Some(0.001)));
        let result = sampler
            .sample(|| {
                std::thread::sleep(Duration::from_millis(2));
                Ok::<_, ()>(())
            })
            .unwrap();

        assert_eq!(result.samples.len(), 1);
    }

    #[test]
    fn test_non_positive_min_time_is_ignored() {
        for min_time in [0.0, -1.0] {
            let sampler = Sampler::new(config(0, 3, Some(min_time)));
            let result = sampler.sample(|| Ok::<_, ()>(())).unwrap();
            assert_eq!(result.samples.len(), 3);
        }
    }

    #[test]
    fn test_zero_repeats_yields_nan_summary() {
        let sampler = Sampler::new(config(1, 0, None));
        let result = sampler.sample(|| Ok::<_, ()>("warm")).unwrap();

        assert!(result.samples.is_empty());
        assert!(result.summary.median.is_nan());
        assert_eq!(result.summary.std_dev, 0.0);
        assert_eq!(result.output, Some("warm"));
    }

    #[test]
    fn test_error_propagates_without_retry() {
        let calls = Cell::new(0u32);
        let sampler = Sampler::new(config(0, 5, None));
        let result = sampler.sample(|| {
            calls.set(calls.get() + 1);
            if calls.get() == 2 { Err("boom") } else { Ok(()) }
        });

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.get(), 2);
    }
}
