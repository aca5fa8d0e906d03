//! Benchmark Suite
//!
//! Owns several benchmarks and drives them one after another. A benchmark that
//! cannot run does not stop the others.

use crate::benchmark::Benchmark;
use crate::error::BenchError;
use crate::sampler::SamplerConfig;
use crate::table::{FormatOptions, ReportTable, Reporter};
use crate::value::Arg;
use std::collections::HashMap;
use tracing::{error, info};

/// Builds the call arguments for one input
pub type ArgsBuilder = Box<dyn Fn(u64) -> Vec<Arg>>;

/// Named benchmarks in insertion order
#[derive(Debug, Default)]
pub struct BenchmarkSuite {
    benchmarks: Vec<Benchmark>,
}

impl BenchmarkSuite {
    /// Create an empty suite
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a benchmark; a benchmark with the same name is replaced in place
    pub fn add_benchmark(&mut self, benchmark: Benchmark) {
        match self
            .benchmarks
            .iter_mut()
            .find(|b| b.name() == benchmark.name())
        {
            Some(existing) => *existing = benchmark,
            None => self.benchmarks.push(benchmark),
        }
    }

    /// Benchmarks in insertion order
    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    /// Look up a benchmark by name
    pub fn get(&self, name: &str) -> Option<&Benchmark> {
        self.benchmarks.iter().find(|b| b.name() == name)
    }

    /// Number of benchmarks
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Whether the suite holds no benchmarks
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Run every benchmark with its own inputs and argument builder
    ///
    /// Returns the benchmarks that could not run, paired with the reason.
    pub fn run_all(
        &mut self,
        inputs_by_name: &HashMap<String, Vec<u64>>,
        args_builders_by_name: &HashMap<String, ArgsBuilder>,
        config: &SamplerConfig,
    ) -> Vec<(String, BenchError)> {
        let mut failures = Vec::new();

        for bench in &mut self.benchmarks {
            let name = bench.name().to_string();
            info!("=== Running {name} ===");

            let outcome = match (
                inputs_by_name.get(&name),
                args_builders_by_name.get(&name),
            ) {
                (None, _) => Err(BenchError::MissingInputs(name.clone())),
                (_, None) => Err(BenchError::MissingArgsBuilder(name.clone())),
                (Some(inputs), Some(builder)) => bench.run(inputs, builder, config),
            };

            if let Err(e) = outcome {
                error!(benchmark = %name, error = %e, "benchmark did not run");
                failures.push((name, e));
            }
        }

        failures
    }

    /// Report tables for every benchmark, in insertion order
    pub fn reports(&self, options: &FormatOptions) -> Vec<ReportTable> {
        self.benchmarks.iter().map(|b| b.report(options)).collect()
    }

    /// Render every benchmark's report with `reporter`, in insertion order
    pub fn final_report(&self, options: &FormatOptions, reporter: &dyn Reporter) -> Vec<String> {
        self.benchmarks
            .iter()
            .map(|b| reporter.render(&b.report(options)))
            .collect()
    }
}
