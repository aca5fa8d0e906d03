//! Suite Assembly
//!
//! Builds the loader from configuration and registers every available
//! implementation of each bundled algorithm into a [`BenchmarkSuite`].

use crate::config::NumbenchConfig;
use numbench_core::{Arg, ArgsBuilder, Benchmark, BenchmarkSuite};
use numbench_loader::{Loader, NativeRegistry};
use regex::Regex;
use std::collections::HashMap;

/// A bundled algorithm and the benchmark that measures it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Algorithm {
    /// Loader key, used for library and symbol names
    pub key: &'static str,
    /// Benchmark name shown in reports
    pub benchmark: &'static str,
}

/// Algorithms in run order
pub const ALGORITHMS: [Algorithm; 2] = [
    Algorithm {
        key: "sieve",
        benchmark: "Prime Sieve",
    },
    Algorithm {
        key: "trapezoid",
        benchmark: "Trapezoidal Integration",
    },
];

impl Algorithm {
    /// Whether `filter` selects this algorithm (by benchmark name or key)
    pub fn matches(&self, filter: Option<&Regex>) -> bool {
        filter.is_none_or(|re| re.is_match(self.benchmark) || re.is_match(self.key))
    }
}

/// Everything [`BenchmarkSuite::run_all`] needs
pub struct RunPlan {
    /// Benchmarks with their implementations registered
    pub suite: BenchmarkSuite,
    /// Inputs per benchmark name
    pub inputs: HashMap<String, Vec<u64>>,
    /// Argument builder per benchmark name
    pub args_builders: HashMap<String, ArgsBuilder>,
}

/// Loader over the bundled native kernels and the configured library directories
pub fn build_loader(config: &NumbenchConfig) -> Loader {
    let natives: NativeRegistry = numbench_kernels::entries().into_iter().collect();
    let bounds = vec![Arg::Float(config.trapezoid.a), Arg::Float(config.trapezoid.b)];

    let mut loader = Loader::new(natives)
        .with_library_root(&config.languages.root)
        .with_bound_args("trapezoid", bounds);
    for (language, dir) in &config.languages.dirs {
        loader = loader.with_library_dir(*language, dir);
    }
    loader
}

fn size_args(n: u64) -> Vec<Arg> {
    vec![Arg::Int(i64::try_from(n).unwrap_or(i64::MAX))]
}

/// Register every loadable implementation of each selected algorithm
pub fn build_plan(config: &NumbenchConfig, loader: &Loader, filter: Option<&Regex>) -> RunPlan {
    let mut suite = BenchmarkSuite::new();
    let mut inputs = HashMap::new();
    let mut args_builders: HashMap<String, ArgsBuilder> = HashMap::new();

    for algorithm in ALGORITHMS.iter().filter(|a| a.matches(filter)) {
        let (tolerance, algorithm_inputs) = match algorithm.key {
            "sieve" => (config.sieve.tolerance, config.sieve.inputs.clone()),
            _ => (config.trapezoid.tolerance, config.trapezoid.inputs.clone()),
        };

        let mut benchmark = Benchmark::new(algorithm.benchmark).with_tolerance(tolerance);
        for (label, implementation) in loader.load_all(algorithm.key, &config.languages.enabled) {
            benchmark.register(label, implementation);
        }
        tracing::info!(
            benchmark = algorithm.benchmark,
            implementations = benchmark.labels().count(),
            "Registered implementations"
        );

        let name = algorithm.benchmark.to_string();
        inputs.insert(name.clone(), algorithm_inputs);
        args_builders.insert(name, Box::new(size_args));
        suite.add_benchmark(benchmark);
    }

    RunPlan {
        suite,
        inputs,
        args_builders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numbench_core::{SamplerConfig, Value};
    use numbench_loader::Language;

    fn isolated_config() -> (tempfile::TempDir, NumbenchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NumbenchConfig::default();
        config.languages.root = dir.path().to_path_buf();
        config.sieve.inputs = vec![10, 100];
        config.trapezoid.inputs = vec![10, 1000];
        (dir, config)
    }

    #[test]
    fn test_filter_matches_name_or_key() {
        let re = Regex::new("^Prime").unwrap();
        assert!(ALGORITHMS[0].matches(Some(&re)));
        assert!(!ALGORITHMS[1].matches(Some(&re)));

        let re = Regex::new("trap").unwrap();
        assert!(ALGORITHMS[1].matches(Some(&re)));
        assert!(ALGORITHMS.iter().all(|a| a.matches(None)));
    }

    #[test]
    fn test_only_native_without_libraries() {
        let (_dir, config) = isolated_config();
        let loader = build_loader(&config);
        let plan = build_plan(&config, &loader, None);

        assert_eq!(plan.suite.len(), 2);
        for benchmark in plan.suite.benchmarks() {
            assert_eq!(benchmark.labels().collect::<Vec<_>>(), vec!["Native"]);
        }
    }

    #[test]
    fn test_trapezoid_bounds_are_applied() {
        let (_dir, mut config) = isolated_config();
        config.trapezoid.a = 0.0;
        config.trapezoid.b = 3.0;
        let loader = build_loader(&config);

        let imp = loader.load("trapezoid", Language::Native).unwrap();
        let Ok(Value::Scalar(v)) = imp.call(&[Arg::Int(100_000)]) else {
            panic!("expected a scalar");
        };
        assert!((v - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_plan_runs() {
        let (_dir, config) = isolated_config();
        let loader = build_loader(&config);
        let mut plan = build_plan(&config, &loader, Some(&Regex::new("sieve").unwrap()));

        let sampler = SamplerConfig {
            warmups: 0,
            repeats: 1,
            min_time: None,
        };
        let failures = plan.suite.run_all(&plan.inputs, &plan.args_builders, &sampler);
        assert!(failures.is_empty());

        let benchmark = plan.suite.get("Prime Sieve").unwrap();
        assert_eq!(benchmark.results().len(), 2);
    }

    #[test]
    fn test_missing_reference_when_native_disabled() {
        let (_dir, mut config) = isolated_config();
        config.languages.enabled = vec![Language::C];
        let loader = build_loader(&config);
        let mut plan = build_plan(&config, &loader, None);

        let failures = plan
            .suite
            .run_all(&plan.inputs, &plan.args_builders, &SamplerConfig::default());
        assert_eq!(failures.len(), 2);
    }
}
