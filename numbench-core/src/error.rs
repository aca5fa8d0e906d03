//! Benchmark Errors

use thiserror::Error;

/// Errors that abort a benchmark run
///
/// Implementation failures never show up here; they are logged and leave gaps
/// in the results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// The benchmark has no implementation under the reference label
    #[error("benchmark '{benchmark}' has no reference implementation registered as '{label}'")]
    MissingReference {
        /// Benchmark name
        benchmark: String,
        /// Expected reference label
        label: String,
    },

    /// The suite was given no inputs for this benchmark
    #[error("no inputs supplied for benchmark '{0}'")]
    MissingInputs(String),

    /// The suite was given no argument builder for this benchmark
    #[error("no argument builder supplied for benchmark '{0}'")]
    MissingArgsBuilder(String),
}
