#![warn(missing_docs)]
//! NumBench Report - Rendering and Persistence
//!
//! Turns [`ReportTable`]s into output text:
//! - TSV (`==== title ====` blocks, tab-separated)
//! - Human (aligned columns with speedups against the reference)
//! - CSV (spreadsheet-compatible)
//! - JSON (machine-readable)
//!
//! and persists whole runs as long-form records.

mod csv;
mod human;
mod json;
mod records;
mod tsv;

pub use self::csv::CsvReporter;
pub use human::{HumanReporter, SAMPLE_MAX_INPUT, SAMPLE_WIDTH, format_sample_outputs};
pub use json::{JsonReporter, PersistError, RunMeta, RunReport, generate_json_report, make_run_id};
pub use records::{RunRecord, normalize_records};
pub use tsv::TsvReporter;

pub use numbench_core::{Cell, FormatOptions, ReportTable, Reporter};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned terminal table
    #[default]
    Human,
    /// Tab-separated blocks
    Tsv,
    /// JSON document per table
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl OutputFormat {
    /// Reporter for this format
    pub fn reporter(self, options: &FormatOptions) -> Box<dyn Reporter> {
        match self {
            OutputFormat::Human => Box::new(HumanReporter::new(options.clone())),
            OutputFormat::Tsv => Box::new(TsvReporter),
            OutputFormat::Json => Box::new(JsonReporter),
            OutputFormat::Csv => Box::new(CsvReporter),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "tsv" | "plain" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Human => "human",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use numbench_core::{
        Benchmark, Cell, ImplError, Implementation, REFERENCE_LABEL, ReportTable, SamplerConfig,
        Value, size_arg, time_column,
    };
    use std::collections::BTreeMap;

    pub fn quick() -> SamplerConfig {
        SamplerConfig {
            warmups: 0,
            repeats: 1,
            min_time: None,
        }
    }

    /// Sieve-shaped benchmark run over 10 and 100,000; "Broken" always fails
    pub fn sieve_benchmark() -> Benchmark {
        let halves = || {
            Implementation::new(|args| {
                let n = size_arg(args, 0)? as i64;
                Ok(Value::Sequence((0..n / 2).collect()))
            })
        };

        let mut bench = Benchmark::new("Prime Sieve");
        bench.register(REFERENCE_LABEL, halves());
        bench.register("C", halves());
        bench.register(
            "Broken",
            Implementation::new(|_| Err(ImplError::Failed("always fails".into()))),
        );
        bench
            .run(&[10, 100_000], |n| vec![(n as i64).into()], &quick())
            .expect("reference is registered");
        bench
    }

    /// Two-row sieve table with a missing C++ timing
    pub fn sieve_table() -> ReportTable {
        let headers = vec![
            "N (max)".to_string(),
            "Prime Count".to_string(),
            time_column("C"),
            time_column("C++"),
            time_column("Native"),
        ];
        let row = |n: &str, count: &str, c: f64, cpp: f64, native: f64| {
            BTreeMap::from([
                ("N (max)".to_string(), Cell::Text(n.into())),
                ("Prime Count".to_string(), Cell::Text(count.into())),
                (time_column("C"), Cell::Number(c)),
                (time_column("C++"), Cell::Number(cpp)),
                (time_column("Native"), Cell::Number(native)),
            ])
        };
        ReportTable {
            title: "Prime Sieve".into(),
            headers,
            rows: vec![
                row("10", "4", 0.000001, f64::NAN, 0.000002),
                row("100,000", "9,592", 0.001, f64::NAN, 0.004),
            ],
        }
    }
}
