//! Long-Form Records
//!
//! One record per (recorded input, implementation), with the reference-derived
//! metric carried under a stable name. Values come from the benchmark's raw
//! results, never from the formatted table text.

use numbench_core::{Benchmark, REFERENCE_LABEL, ReportKind, Value};
use serde::{Deserialize, Serialize};

/// One timing observation in long form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run identifier
    pub run_id: String,
    /// Benchmark name
    pub algorithm: String,
    /// Implementation label
    pub lang: String,
    /// Input value
    pub input: u64,
    /// Median time in seconds; `None` when the implementation has no timing
    pub time_s: Option<f64>,
    /// Reference prime count (sieve-like benchmarks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime_count: Option<u64>,
    /// Reference integral (integration-like benchmarks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integral: Option<f64>,
}

/// Flatten `benchmark`'s recorded results into long-form records tagged with `run_id`
///
/// Every registered label gets a record for every recorded input, so an
/// implementation that failed on an input shows up with `time_s: None`.
pub fn normalize_records(benchmark: &Benchmark, run_id: &str) -> Vec<RunRecord> {
    let labels: Vec<&str> = benchmark.labels().collect();
    let kind = benchmark.report_kind();

    let mut records = Vec::with_capacity(benchmark.results().len() * labels.len());
    for (timings, outputs) in benchmark.results().iter().zip(benchmark.outputs()) {
        let reference = outputs.outputs.get(REFERENCE_LABEL);
        let prime_count = match kind {
            ReportKind::PrimeCount => reference
                .and_then(Value::as_sequence)
                .map(|s| s.len() as u64),
            _ => None,
        };
        let integral = match kind {
            ReportKind::Integral => reference.and_then(Value::as_scalar),
            _ => None,
        };

        for label in &labels {
            let time_s = Some(timings.median(label)).filter(|t| !t.is_nan());

            records.push(RunRecord {
                run_id: run_id.to_string(),
                algorithm: benchmark.name().to_string(),
                lang: label.to_string(),
                input: timings.input,
                time_s,
                prime_count,
                integral,
            });
        }
    }
    records
}
