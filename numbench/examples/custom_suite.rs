//! Custom Suite Example
//!
//! Benchmarks three ways of summing `1..=n` against a reference, one of which
//! is deliberately wrong, and prints the human-readable report.
//!
//! Run with:
//!   cargo run -p numbench --example custom_suite

use numbench::prelude::*;
use numbench::{HumanReporter, format_sample_outputs};

fn n_of(args: &[Arg]) -> Result<i64, ImplError> {
    args.first().and_then(Arg::as_int).ok_or(ImplError::InvalidArg {
        index: 0,
        expected: "an integer",
    })
}

fn main() {
    let mut bench = Benchmark::new("Triangular Numbers").with_tolerance(0.0);

    bench.register(
        REFERENCE_LABEL,
        Implementation::new(|args| {
            let n = n_of(args)?;
            Ok(Value::Scalar((n * (n + 1) / 2) as f64))
        }),
    );
    bench.register(
        "Loop",
        Implementation::new(|args| {
            let n = n_of(args)?;
            Ok(Value::Scalar((1..=n).sum::<i64>() as f64))
        }),
    );
    bench.register(
        "Off By One",
        Implementation::new(|args| {
            let n = n_of(args)?;
            Ok(Value::Scalar((1..n).sum::<i64>() as f64))
        }),
    );

    let config = SamplerConfig {
        warmups: 2,
        repeats: 10,
        min_time: Some(0.05),
    };
    if let Err(e) = bench.run(&[10, 10_000, 1_000_000], |n| vec![Arg::Int(n as i64)], &config) {
        eprintln!("benchmark could not run: {e}");
        return;
    }

    let options = FormatOptions::default();
    println!("{}", HumanReporter::new(options.clone()).render(&bench.report(&options)));
    if let Some(samples) = format_sample_outputs(bench.outputs()) {
        println!("{samples}");
    }
}
