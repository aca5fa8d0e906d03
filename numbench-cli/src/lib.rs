#![warn(missing_docs)]
//! numbench CLI Library
//!
//! Command-line front end: reads `numbench.toml`, loads every available
//! implementation, runs the suite and prints or saves the reports.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     numbench_cli::run()
//! }
//! ```

mod config;
mod setup;

pub use config::*;
pub use setup::{ALGORITHMS, Algorithm, RunPlan, build_loader, build_plan};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use numbench_core::pin_to_cpu;
use numbench_loader::Language;
use numbench_report::{
    OutputFormat, RunReport, SAMPLE_MAX_INPUT, format_sample_outputs, generate_json_report,
    make_run_id,
};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// numbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "numbench")]
#[command(author, version, about = "numbench - compare implementations of numeric kernels across languages")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: discover numbench.toml upwards)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: human, tsv, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only run benchmarks whose name or algorithm matches this regex
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Untimed calls before sampling
    #[arg(long)]
    pub warmups: Option<u32>,

    /// Maximum timed calls per input
    #[arg(long)]
    pub repeats: Option<u32>,

    /// Stop sampling once samples add up to this (e.g. "0.5s", "200ms")
    #[arg(long)]
    pub min_time: Option<String>,

    /// Pin the process to this CPU core before running
    #[arg(long)]
    pub pin_cpu: Option<usize>,

    /// Save a JSON run document to the output directory
    #[arg(long)]
    pub save_json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run benchmarks (default)
    Run,
    /// Show which implementations resolve for each algorithm
    List,
    /// Write a default numbench.toml
    Init {
        /// Where to write the file
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the numbench CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the numbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Init { ref path, force }) => init_config(path, force),
        Some(Commands::List) => {
            let config = resolve_config(&cli)?;
            list_implementations(&cli, &config)
        }
        Some(Commands::Run) | None => {
            let config = resolve_config(&cli)?;
            run_benchmarks(&cli, &config)
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "numbench=debug" } else { "numbench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the configuration file and apply CLI overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<NumbenchConfig> {
    let mut config = match &cli.config {
        Some(path) => NumbenchConfig::load(path)?,
        None => match NumbenchConfig::discover()? {
            Some((path, config)) => {
                tracing::debug!(path = %path.display(), "Using configuration file");
                config
            }
            None => NumbenchConfig::default(),
        },
    };

    if let Some(warmups) = cli.warmups {
        config.runner.warmups = warmups;
    }
    if let Some(repeats) = cli.repeats {
        config.runner.repeats = repeats;
    }
    if let Some(min_time) = &cli.min_time {
        config.runner.min_time = Some(min_time.clone());
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if cli.save_json {
        config.output.save_json = true;
    }

    Ok(config)
}

fn compile_filter(cli: &Cli) -> anyhow::Result<Option<Regex>> {
    cli.filter
        .as_deref()
        .map(|pattern| Regex::new(pattern).with_context(|| format!("invalid filter '{pattern}'")))
        .transpose()
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, NumbenchConfig::default_toml())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn list_implementations(cli: &Cli, config: &NumbenchConfig) -> anyhow::Result<()> {
    let filter = compile_filter(cli)?;
    let loader = build_loader(config);

    println!("numbench implementations:");
    for algorithm in ALGORITHMS.iter().filter(|a| a.matches(filter.as_ref())) {
        println!("├── {} ({})", algorithm.benchmark, algorithm.key);
        for &language in &config.languages.enabled {
            let location = loader
                .library_path(algorithm.key, language)
                .map(|p| format!(" [{}]", p.display()))
                .unwrap_or_default();
            match loader.resolve(algorithm.key, language) {
                Ok(_) => println!("│   ├── ✓ {}{}", language.label(), location),
                Err(e) => println!("│   ├── ✗ {}: {}", language.label(), e),
            }
        }
    }

    if !config.languages.enabled.contains(&Language::Native) {
        println!("warning: reference language 'native' is not enabled");
    }
    Ok(())
}

fn run_benchmarks(cli: &Cli, config: &NumbenchConfig) -> anyhow::Result<()> {
    let format: OutputFormat = config
        .output
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let sampler = config.runner.sampler_config()?;
    let filter = compile_filter(cli)?;

    if let Some(core) = cli.pin_cpu {
        match pin_to_cpu(core) {
            Ok(()) => tracing::info!(core, "Pinned to CPU"),
            Err(e) => tracing::warn!(core, error = %e, "Could not pin to CPU"),
        }
    }

    let loader = build_loader(config);
    let mut plan = build_plan(config, &loader, filter.as_ref());
    if plan.suite.is_empty() {
        bail!("no benchmarks match the filter");
    }

    let start = Instant::now();
    let failures = plan
        .suite
        .run_all(&plan.inputs, &plan.args_builders, &sampler);
    tracing::info!(elapsed_s = start.elapsed().as_secs_f64(), "Run finished");

    let run_id = make_run_id("bench");
    let run_report = RunReport::from_suite(
        run_id,
        serde_json::to_value(config).context("failed to serialize configuration")?,
        &plan.suite,
        &config.format,
    );

    let output = match format {
        OutputFormat::Json => generate_json_report(&run_report)?,
        OutputFormat::Human => {
            let reporter = format.reporter(&config.format);
            let rendered = plan.suite.final_report(&config.format, reporter.as_ref());
            let mut sections = Vec::with_capacity(rendered.len());
            for (text, benchmark) in rendered.into_iter().zip(plan.suite.benchmarks()) {
                sections.push(text);
                let small = benchmark.sample_outputs(SAMPLE_MAX_INPUT);
                if let Some(samples) = format_sample_outputs(small) {
                    sections.push(samples);
                }
            }
            sections.join("\n")
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let reporter = format.reporter(&config.format);
            plan.suite
                .final_report(&config.format, reporter.as_ref())
                .join("\n")
        }
    };

    if let Some(path) = &cli.output {
        std::fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
    } else {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", output)?;
    }

    if config.output.save_json {
        run_report.save(Path::new(&config.output.directory))?;
    }

    if !failures.is_empty() {
        let names: Vec<String> = failures
            .iter()
            .map(|(name, e)| format!("{name}: {e}"))
            .collect();
        bail!("{} benchmark(s) could not run: {}", failures.len(), names.join("; "));
    }

    Ok(())
}
