#![warn(missing_docs)]
//! # numbench
//!
//! Cross-implementation benchmarking harness: time interchangeable
//! implementations of the same pure function and check every one of them
//! against a trusted reference.
//!
//! - **Uniform calls**: in-process functions and shared-library symbols are
//!   normalized to `Fn(&[Arg]) -> Result<Value, ImplError>`
//! - **Failure isolation**: a failing or panicking candidate leaves a gap in
//!   the report instead of aborting the run
//! - **Correctness checks**: sequence outputs must match exactly, scalar
//!   outputs within an absolute tolerance
//! - **Reports**: TSV, aligned text, CSV and JSON, plus long-form run records
//!
//! ## Quick Start
//!
//! ```ignore
//! use numbench::prelude::*;
//!
//! let mut bench = Benchmark::new("Prime Sieve");
//! bench.register(REFERENCE_LABEL, Implementation::new(numbench::kernels::sieve_native));
//! bench.run(&[10, 1000], |n| vec![Arg::Int(n as i64)], &SamplerConfig::default())?;
//! println!("{}", TsvReporter.render(&bench.report(&FormatOptions::default())));
//! ```

// Re-export core types
pub use numbench_core::{
    Agreement, Arg, ArgsBuilder, BenchError, Benchmark, BenchmarkSuite, Cell, DEFAULT_REPEATS,
    DEFAULT_TOLERANCE, DEFAULT_WARMUPS, FormatOptions, ImplError, Implementation, InputOutputs,
    InputTimings, REFERENCE_LABEL, ReportKind, ReportTable, Reporter, SampledTiming, Sampler,
    SamplerConfig, TIME_COLUMN_SUFFIX, Timer, Value, check_agreement, pin_to_cpu, time_column,
};

// Re-export loader
pub use numbench_loader::{
    Binding, CType, ForeignAbi, ForeignFn, ForeignSymbol, Language, Loader, NativeFn,
    NativeRegistry, Platform, Signature, SignatureTable,
};

// Re-export reporting
pub use numbench_report::{
    CsvReporter, HumanReporter, JsonReporter, OutputFormat, RunMeta, RunRecord, RunReport,
    TsvReporter, format_sample_outputs, make_run_id, normalize_records,
};

// Re-export stats
pub use numbench_stats::{SummaryStatistics, compute_summary};

/// Bundled reference kernels
pub use numbench_kernels as kernels;

/// Command-line entry point
pub use numbench_cli::run;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Arg, Benchmark, BenchmarkSuite, FormatOptions, ImplError, Implementation, Language,
        Loader, REFERENCE_LABEL, Reporter, SamplerConfig, TsvReporter, Value,
    };
}
