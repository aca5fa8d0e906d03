//! Benchmark
//!
//! Times and validates every registered implementation of one algorithm over a
//! list of inputs.
//!
//! ## Per-input flow
//!
//! ```text
//! args_builder(input)
//!        │
//!        ▼
//!  reference ──(fails)──► log error, skip input
//!        │
//!        ▼
//!  each candidate ──(fails)──► log warning, omit candidate
//!        │
//!        ▼
//!  check_agreement ──(differs)──► log warning, keep timing
//!        │
//!        ▼
//!  append (input, timings) / (input, outputs)
//! ```
//!
//! Panics inside an implementation are caught and handled like returned errors.

use crate::REFERENCE_LABEL;
use crate::error::BenchError;
use crate::sampler::{Sampler, SamplerConfig};
use crate::table::{Cell, FormatOptions, ReportTable, time_column};
use crate::validation::check_agreement;
use crate::value::{Arg, ImplError, Implementation, Value};
use numbench_stats::SummaryStatistics;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error, info, warn};

/// Default absolute tolerance for scalar outputs
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Which reference-derived metric the report surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportKind {
    /// Sieve-like: count of the reference sequence
    PrimeCount,
    /// Integration-like: the reference scalar
    Integral,
    /// Anything else: input size only
    #[default]
    InputSize,
}

impl ReportKind {
    /// Choose a kind from a benchmark name
    ///
    /// Names starting with "prime sieve" report prime counts; names containing
    /// "trapezoidal" report integrals. Both checks ignore case.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.starts_with("prime sieve") {
            ReportKind::PrimeCount
        } else if lower.contains("trapezoidal") {
            ReportKind::Integral
        } else {
            ReportKind::InputSize
        }
    }

    /// Leading (non-timing) column names
    pub fn id_headers(self) -> &'static [&'static str] {
        match self {
            ReportKind::PrimeCount => &["N (max)", "Prime Count"],
            ReportKind::Integral => &["N (subints)", "Integral"],
            ReportKind::InputSize => &["Input Size"],
        }
    }
}

/// Timings recorded for one input
#[derive(Debug, Clone)]
pub struct InputTimings {
    /// Input value
    pub input: u64,
    /// Summary per implementation label
    pub timings: BTreeMap<String, SummaryStatistics>,
}

impl InputTimings {
    /// Median elapsed seconds for `label`, NaN if it was not recorded
    pub fn median(&self, label: &str) -> f64 {
        self.timings.get(label).map_or(f64::NAN, |s| s.median)
    }
}

/// Outputs recorded for one input
#[derive(Debug, Clone)]
pub struct InputOutputs {
    /// Input value
    pub input: u64,
    /// Output per implementation label
    pub outputs: BTreeMap<String, Value>,
}

/// One algorithm's implementations and their recorded results
#[derive(Debug)]
pub struct Benchmark {
    name: String,
    tolerance: f64,
    kind: ReportKind,
    implementations: BTreeMap<String, Implementation>,
    results: Vec<InputTimings>,
    outputs: Vec<InputOutputs>,
}

impl Benchmark {
    /// Create a benchmark; the report kind is inferred from the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = ReportKind::infer(&name);
        Self {
            name,
            tolerance: DEFAULT_TOLERANCE,
            kind,
            implementations: BTreeMap::new(),
            results: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the absolute scalar tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the report kind explicitly
    pub fn with_report_kind(mut self, kind: ReportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Benchmark name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute scalar tolerance
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Report kind
    pub fn report_kind(&self) -> ReportKind {
        self.kind
    }

    /// Insert or replace the implementation under `label`
    pub fn register(&mut self, label: impl Into<String>, implementation: Implementation) {
        self.implementations.insert(label.into(), implementation);
    }

    /// Registered labels, sorted
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.implementations.keys().map(String::as_str)
    }

    /// Recorded timings, in processing order
    pub fn results(&self) -> &[InputTimings] {
        &self.results
    }

    /// Recorded outputs, in processing order
    pub fn outputs(&self) -> &[InputOutputs] {
        &self.outputs
    }

    /// Run every implementation over `inputs`
    ///
    /// Fails only if no reference implementation is registered; that check
    /// happens before anything is timed. Every other failure is logged and
    /// leaves a gap in the results.
    pub fn run<F>(
        &mut self,
        inputs: &[u64],
        args_builder: F,
        config: &SamplerConfig,
    ) -> Result<(), BenchError>
    where
        F: Fn(u64) -> Vec<Arg>,
    {
        let Some(reference) = self.implementations.get(REFERENCE_LABEL) else {
            return Err(BenchError::MissingReference {
                benchmark: self.name.clone(),
                label: REFERENCE_LABEL.to_string(),
            });
        };

        info!(
            benchmark = %self.name,
            implementations = self.implementations.len(),
            inputs = inputs.len(),
            "running benchmark"
        );

        let sampler = Sampler::new(*config);

        for &input in inputs {
            let args = args_builder(input);

            let (ref_summary, ref_output) = match measure(&sampler, reference, &args) {
                Ok(measured) => measured,
                Err(e) => {
                    error!(
                        benchmark = %self.name,
                        input,
                        error = %e,
                        "reference implementation failed; skipping input"
                    );
                    continue;
                }
            };
            debug!(label = REFERENCE_LABEL, input, median = ref_summary.median, "timed");

            let mut timings = BTreeMap::new();
            let mut outputs = BTreeMap::new();

            for (label, implementation) in &self.implementations {
                if label == REFERENCE_LABEL {
                    continue;
                }

                let (summary, output) = match measure(&sampler, implementation, &args) {
                    Ok(measured) => measured,
                    Err(e) => {
                        warn!(
                            benchmark = %self.name,
                            label = %label,
                            input,
                            error = %e,
                            "implementation failed"
                        );
                        continue;
                    }
                };
                debug!(label = %label, input, median = summary.median, "timed");

                let agreement = check_agreement(&ref_output, &output, self.tolerance);
                if !agreement.is_match() {
                    warn!(
                        benchmark = %self.name,
                        label = %label,
                        input,
                        "output differs from reference: {agreement}"
                    );
                }

                timings.insert(label.clone(), summary);
                outputs.insert(label.clone(), output);
            }

            timings.insert(REFERENCE_LABEL.to_string(), ref_summary);
            outputs.insert(REFERENCE_LABEL.to_string(), ref_output);

            self.results.push(InputTimings { input, timings });
            self.outputs.push(InputOutputs { input, outputs });
        }

        Ok(())
    }

    /// Shape recorded results into a report table
    ///
    /// One timing column per registered label (sorted), one row per recorded
    /// input. Missing timings are NaN.
    pub fn report(&self, options: &FormatOptions) -> ReportTable {
        let labels: Vec<&str> = self.labels().collect();

        let mut headers: Vec<String> = self
            .kind
            .id_headers()
            .iter()
            .map(|h| h.to_string())
            .collect();
        headers.extend(labels.iter().map(|label| time_column(label)));

        let rows = self
            .results
            .iter()
            .zip(&self.outputs)
            .map(|(timings, outputs)| {
                let mut row = BTreeMap::new();
                row.insert(
                    headers[0].clone(),
                    Cell::Text(options.format_count(timings.input)),
                );

                let reference = outputs.outputs.get(REFERENCE_LABEL);
                match self.kind {
                    ReportKind::PrimeCount => {
                        let count = reference
                            .and_then(Value::as_sequence)
                            .map_or_else(
                                || "-".to_string(),
                                |s| options.format_count(s.len() as u64),
                            );
                        row.insert(headers[1].clone(), Cell::Text(count));
                    }
                    ReportKind::Integral => {
                        let integral = reference
                            .and_then(Value::as_scalar)
                            .map_or_else(|| "-".to_string(), |v| options.format_integral(v));
                        row.insert(headers[1].clone(), Cell::Text(integral));
                    }
                    ReportKind::InputSize => {}
                }

                for label in &labels {
                    row.insert(time_column(label), Cell::Number(timings.median(label)));
                }
                row
            })
            .collect();

        ReportTable {
            title: self.name.clone(),
            headers,
            rows,
        }
    }

    /// Outputs recorded for inputs no larger than `max_input`
    pub fn sample_outputs(&self, max_input: u64) -> impl Iterator<Item = &InputOutputs> {
        self.outputs.iter().filter(move |o| o.input <= max_input)
    }
}

/// Sample one implementation and return its summary and last output
fn measure(
    sampler: &Sampler,
    implementation: &Implementation,
    args: &[Arg],
) -> Result<(SummaryStatistics, Value), ImplError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let sampled = sampler.sample(|| implementation.call(args))?;
        let output = match sampled.output {
            Some(output) => output,
            None => implementation.call(args)?,
        };
        Ok((sampled.summary, output))
    }));

    match outcome {
        Ok(result) => result,
        Err(payload) => Err(ImplError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{check_arity, size_arg};
    use std::cell::Cell as StdCell;
    use std::io;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a thread-local subscriber and return the WARN+ lines it logged
    fn capture_warnings(f: impl FnOnce()) -> Vec<String> {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn quick() -> SamplerConfig {
        SamplerConfig {
            warmups: 0,
            repeats: 2,
            min_time: None,
        }
    }

    fn count_up() -> Implementation {
        Implementation::new(|args| {
            check_arity(args, 1)?;
            let n = size_arg(args, 0)? as i64;
            Ok(Value::Sequence((1..=n).collect()))
        })
    }

    fn n_args(n: u64) -> Vec<Arg> {
        vec![Arg::Int(n as i64)]
    }

    #[test]
    fn test_report_kind_inference() {
        assert_eq!(ReportKind::infer("Prime Sieve"), ReportKind::PrimeCount);
        assert_eq!(ReportKind::infer("prime sieve (small)"), ReportKind::PrimeCount);
        assert_eq!(
            ReportKind::infer("Trapezoidal Integration"),
            ReportKind::Integral
        );
        assert_eq!(ReportKind::infer("Matrix Multiply"), ReportKind::InputSize);
    }

    #[test]
    fn test_register_replaces() {
        let mut bench = Benchmark::new("Counting");
        bench.register("A", count_up());
        bench.register("A", count_up());
        bench.register(REFERENCE_LABEL, count_up());

        assert_eq!(bench.labels().collect::<Vec<_>>(), vec!["A", REFERENCE_LABEL]);
    }

    #[test]
    fn test_missing_reference_fails_before_timing() {
        let calls = Rc::new(StdCell::new(0u32));
        let seen = Rc::clone(&calls);

        let mut bench = Benchmark::new("Counting");
        bench.register(
            "Candidate",
            Implementation::new(move |_| {
                seen.set(seen.get() + 1);
                Ok(Value::Scalar(0.0))
            }),
        );

        let err = bench.run(&[1, 2], n_args, &quick()).unwrap_err();
        assert!(matches!(err, BenchError::MissingReference { .. }));
        assert_eq!(calls.get(), 0);
        assert!(bench.results().is_empty());
    }

    #[test]
    fn test_failing_candidate_is_isolated() {
        let mut bench = Benchmark::new("Counting");
        bench.register(REFERENCE_LABEL, count_up());
        bench.register("Good", count_up());
        bench.register(
            "Broken",
            Implementation::new(|_| Err(ImplError::Failed("always fails".into()))),
        );
        bench.register("Panicky", Implementation::new(|_| panic!("kaboom")));

        bench.run(&[3, 5], n_args, &quick()).unwrap();

        assert_eq!(bench.results().len(), 2);
        for (timings, outputs) in bench.results().iter().zip(bench.outputs()) {
            assert!(timings.timings.contains_key(REFERENCE_LABEL));
            assert!(timings.timings.contains_key("Good"));
            assert!(!timings.timings.contains_key("Broken"));
            assert!(!timings.timings.contains_key("Panicky"));
            assert_eq!(outputs.outputs["Good"], outputs.outputs[REFERENCE_LABEL]);
        }
    }

    #[test]
    fn test_failing_reference_skips_input() {
        let mut bench = Benchmark::new("Counting");
        bench.register(
            REFERENCE_LABEL,
            Implementation::new(|args| {
                let n = size_arg(args, 0)?;
                if n == 2 {
                    return Err(ImplError::Failed("no".into()));
                }
                Ok(Value::Scalar(n as f64))
            }),
        );

        bench.run(&[1, 2, 3], n_args, &quick()).unwrap();

        let inputs: Vec<u64> = bench.results().iter().map(|r| r.input).collect();
        assert_eq!(inputs, vec![1, 3]);
        assert_eq!(bench.outputs().len(), 2);
    }

    #[test]
    fn test_mismatch_still_records_timing() {
        let mut bench = Benchmark::new("Scalar").with_tolerance(1e-6);
        bench.register(REFERENCE_LABEL, Implementation::new(|_| Ok(Value::Scalar(1.0))));
        bench.register("Off", Implementation::new(|_| Ok(Value::Scalar(1.1))));

        bench.run(&[10], n_args, &quick()).unwrap();

        let timings = &bench.results()[0];
        assert!(timings.timings.contains_key("Off"));
        assert_eq!(bench.outputs()[0].outputs["Off"], Value::Scalar(1.1));
    }

    #[test]
    fn test_deviation_and_failure_are_logged_as_warnings() {
        let mut bench = Benchmark::new("Scalar").with_tolerance(1e-6);
        bench.register(REFERENCE_LABEL, Implementation::new(|_| Ok(Value::Scalar(1.0))));
        bench.register("Off", Implementation::new(|_| Ok(Value::Scalar(1.1))));
        bench.register(
            "Broken",
            Implementation::new(|_| Err(ImplError::Failed("always fails".into()))),
        );
        bench.register("Exact", Implementation::new(|_| Ok(Value::Scalar(1.0))));

        let lines = capture_warnings(|| bench.run(&[10], n_args, &quick()).unwrap());

        let deviation: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("output differs from reference"))
            .collect();
        assert_eq!(deviation.len(), 1);
        assert!(deviation[0].contains("WARN"));
        assert!(deviation[0].contains("label=Off"));
        assert!(deviation[0].contains("input=10"));

        let failure: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("implementation failed"))
            .collect();
        assert_eq!(failure.len(), 1);
        assert!(failure[0].contains("WARN"));
        assert!(failure[0].contains("label=Broken"));
        assert!(failure[0].contains("input=10"));
        assert!(failure[0].contains("always fails"));

        assert!(!lines.iter().any(|l| l.contains("label=Exact")));
    }

    #[test]
    fn test_failing_reference_is_logged_as_error() {
        let mut bench = Benchmark::new("Scalar");
        bench.register(
            REFERENCE_LABEL,
            Implementation::new(|_| Err(ImplError::Failed("no".into()))),
        );

        let lines = capture_warnings(|| bench.run(&[7], n_args, &quick()).unwrap());

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR"));
        assert!(lines[0].contains("skipping input"));
        assert!(lines[0].contains("input=7"));
    }

    #[test]
    fn test_explicit_report_kind() {
        let mut bench =
            Benchmark::new("Eratosthenes").with_report_kind(ReportKind::PrimeCount);
        bench.register(REFERENCE_LABEL, count_up());
        bench.run(&[3], n_args, &quick()).unwrap();

        let table = bench.report(&FormatOptions::default());
        assert_eq!(table.headers[..2], ["N (max)", "Prime Count"]);
        assert_eq!(table.rows[0]["Prime Count"], Cell::Text("3".into()));
    }

    #[test]
    fn test_zero_repeats_still_records_output() {
        let mut bench = Benchmark::new("Scalar");
        bench.register(REFERENCE_LABEL, Implementation::new(|_| Ok(Value::Scalar(2.0))));

        let config = SamplerConfig {
            warmups: 0,
            repeats: 0,
            min_time: None,
        };
        bench.run(&[1], n_args, &config).unwrap();

        assert!(bench.results()[0].median(REFERENCE_LABEL).is_nan());
        assert_eq!(
            bench.outputs()[0].outputs[REFERENCE_LABEL],
            Value::Scalar(2.0)
        );
    }

    #[test]
    fn test_prime_count_report() {
        let mut bench = Benchmark::new("Prime Sieve");
        bench.register(REFERENCE_LABEL, count_up());
        bench.register(
            "Broken",
            Implementation::new(|_| Err(ImplError::Failed("x".into()))),
        );
        bench.run(&[1000, 4], n_args, &quick()).unwrap();

        let table = bench.report(&FormatOptions::default());
        assert_eq!(
            table.headers,
            vec![
                "N (max)".to_string(),
                "Prime Count".to_string(),
                "Broken Time (s)".to_string(),
                "Native Time (s)".to_string(),
            ]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["N (max)"], Cell::Text("1,000".into()));
        assert_eq!(table.rows[0]["Prime Count"], Cell::Text("1,000".into()));
        assert!(table.rows[0]["Broken Time (s)"].is_missing());
        assert!(!table.rows[0]["Native Time (s)"].is_missing());
        assert_eq!(table.rows[1]["Prime Count"], Cell::Text("4".into()));
    }

    #[test]
    fn test_integral_report() {
        let mut bench = Benchmark::new("Trapezoidal Integration");
        bench.register(
            REFERENCE_LABEL,
            Implementation::new(|_| Ok(Value::Scalar(1.0 / 3.0))),
        );
        bench.run(&[100], n_args, &quick()).unwrap();

        let options = FormatOptions {
            integral_decimals: 3,
            show_thousands_sep: false,
            ..Default::default()
        };
        let table = bench.report(&options);
        assert_eq!(table.headers[0], "N (subints)");
        assert_eq!(table.rows[0]["Integral"], Cell::Text("0.333".into()));
    }

    #[test]
    fn test_generic_report_and_empty_results() {
        let mut bench = Benchmark::new("Something");
        bench.register(REFERENCE_LABEL, count_up());

        let table = bench.report(&FormatOptions::default());
        assert_eq!(
            table.headers,
            vec!["Input Size".to_string(), "Native Time (s)".to_string()]
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_sample_outputs_filter() {
        let mut bench = Benchmark::new("Counting");
        bench.register(REFERENCE_LABEL, count_up());
        bench.run(&[5, 50, 10], n_args, &quick()).unwrap();

        let small: Vec<u64> = bench.sample_outputs(20).map(|o| o.input).collect();
        assert_eq!(small, vec![5, 10]);
    }
}
