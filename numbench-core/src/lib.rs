#![warn(missing_docs)]
//! NumBench Core - Benchmark Execution & Validation Engine
//!
//! This crate times interchangeable implementations of the same pure function
//! and checks them against a trusted reference:
//! - `Implementation`: uniform `Fn(&[Arg]) -> Result<Value, ImplError>` callable
//! - `Sampler`: warmup, bounded repeats and a `min_time` budget
//! - `Benchmark`: per-input timing, failure isolation and correctness checks
//! - `BenchmarkSuite`: several benchmarks run in sequence
//! - `ReportTable`: the `(headers, rows)` structure handed to reporters
//!
//! Everything runs on the calling thread, one call at a time.

mod benchmark;
mod error;
mod measure;
mod sampler;
mod suite;
mod table;
mod validation;
mod value;

pub use benchmark::{
    Benchmark, DEFAULT_TOLERANCE, InputOutputs, InputTimings, ReportKind,
};
pub use error::BenchError;
pub use measure::{Timer, pin_to_cpu};
pub use sampler::{DEFAULT_REPEATS, DEFAULT_WARMUPS, SampledTiming, Sampler, SamplerConfig};
pub use suite::{ArgsBuilder, BenchmarkSuite};
pub use table::{
    Cell, FormatOptions, ReportTable, Reporter, TIME_COLUMN_SUFFIX, group_thousands, time_column,
};
pub use validation::{Agreement, check_agreement};
pub use value::{Arg, ImplError, Implementation, Value, check_arity, float_arg, size_arg};

pub use numbench_stats::SummaryStatistics;

/// Label under which the trusted reference implementation is registered
pub const REFERENCE_LABEL: &str = "Native";
