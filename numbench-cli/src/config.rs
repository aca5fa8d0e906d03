//! Configuration loading from numbench.toml
//!
//! numbench configuration can be specified in a `numbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use numbench_core::{FormatOptions, SamplerConfig};
use numbench_loader::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file name looked up by [`NumbenchConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "numbench.toml";

/// Failure loading or interpreting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the file
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid configuration TOML
    #[error("invalid configuration in {}: {source}", .path.display())]
    Toml {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// Duration string could not be parsed
    #[error("invalid duration '{0}'")]
    Duration(String),
}

/// numbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NumbenchConfig {
    /// Sampling policy
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Prime sieve benchmark
    #[serde(default)]
    pub sieve: SieveConfig,
    /// Trapezoidal integration benchmark
    #[serde(default)]
    pub trapezoid: TrapezoidConfig,
    /// Report formatting
    #[serde(default)]
    pub format: FormatOptions,
    /// Which implementations to load and where from
    #[serde(default)]
    pub languages: LanguagesConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for sampling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Untimed calls before sampling
    #[serde(default = "default_warmups")]
    pub warmups: u32,
    /// Maximum timed calls per input
    #[serde(default = "default_repeats")]
    pub repeats: u32,
    /// Stop sampling once samples add up to this much (e.g. "0.5s", "200ms")
    #[serde(default)]
    pub min_time: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            warmups: default_warmups(),
            repeats: default_repeats(),
            min_time: None,
        }
    }
}

fn default_warmups() -> u32 {
    numbench_core::DEFAULT_WARMUPS
}
fn default_repeats() -> u32 {
    numbench_core::DEFAULT_REPEATS
}

impl RunnerConfig {
    /// Sampling policy with `min_time` converted to seconds
    pub fn sampler_config(&self) -> Result<SamplerConfig, ConfigError> {
        let min_time = self
            .min_time
            .as_deref()
            .map(NumbenchConfig::parse_duration)
            .transpose()?;
        Ok(SamplerConfig {
            warmups: self.warmups,
            repeats: self.repeats,
            min_time,
        })
    }
}

/// Prime sieve benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SieveConfig {
    /// Upper bounds to sieve
    #[serde(default = "default_sieve_inputs")]
    pub inputs: Vec<u64>,
    /// Tolerance (sequence outputs are compared exactly)
    #[serde(default = "default_sieve_tolerance")]
    pub tolerance: f64,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            inputs: default_sieve_inputs(),
            tolerance: default_sieve_tolerance(),
        }
    }
}

fn default_sieve_inputs() -> Vec<u64> {
    vec![10, 100_000, 200_000, 400_000, 800_000]
}
fn default_sieve_tolerance() -> f64 {
    1e-9
}

/// Trapezoidal integration benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrapezoidConfig {
    /// Subinterval counts
    #[serde(default = "default_trapezoid_inputs")]
    pub inputs: Vec<u64>,
    /// Absolute tolerance against the reference integral
    #[serde(default = "default_trapezoid_tolerance")]
    pub tolerance: f64,
    /// Lower bound
    #[serde(default)]
    pub a: f64,
    /// Upper bound
    #[serde(default = "default_upper_bound")]
    pub b: f64,
}

impl Default for TrapezoidConfig {
    fn default() -> Self {
        Self {
            inputs: default_trapezoid_inputs(),
            tolerance: default_trapezoid_tolerance(),
            a: 0.0,
            b: default_upper_bound(),
        }
    }
}

fn default_trapezoid_inputs() -> Vec<u64> {
    vec![10, 1_000_000, 2_000_000, 4_000_000]
}
fn default_trapezoid_tolerance() -> f64 {
    1e-8
}
fn default_upper_bound() -> f64 {
    1.0
}

/// Implementation sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesConfig {
    /// Languages to load, in column order
    #[serde(default = "default_enabled")]
    pub enabled: Vec<Language>,
    /// Directory library directories are relative to
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Per-language library directory (default `native/<lang>`)
    #[serde(default)]
    pub dirs: BTreeMap<Language, PathBuf>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            root: default_root(),
            dirs: BTreeMap::new(),
        }
    }
}

fn default_enabled() -> Vec<Language> {
    Language::ALL.to_vec()
}
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "tsv", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for saved runs
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Save a JSON run document after each run
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            save_json: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/numbench".to_string()
}

impl NumbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find `numbench.toml` in `start` or one of its ancestors
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Discover and load configuration by walking up from the current directory
    ///
    /// `Ok(None)` when no file exists; a file that fails to parse is an error.
    pub fn discover() -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let Ok(dir) = std::env::current_dir() else {
            return Ok(None);
        };
        match Self::find_from(&dir) {
            Some(path) => {
                let config = Self::load(&path)?;
                Ok(Some((path, config)))
            }
            None => Ok(None),
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# numbench configuration

[runner]
# Untimed calls before sampling each input
warmups = 1
# Maximum timed calls per input
repeats = 5
# Stop sampling early once samples add up to this (uncomment to enable)
# min_time = "0.5s"

[sieve]
inputs = [10, 100000, 200000, 400000, 800000]
tolerance = 1e-9

[trapezoid]
inputs = [10, 1000000, 2000000, 4000000]
# Absolute tolerance against the reference integral
tolerance = 1e-8
# Integration bounds for f(x) = x^2
a = 0.0
b = 1.0

[format]
integral_decimals = 4
show_thousands_sep = true
time_decimals = 6

[languages]
# Column order follows this list; "native" is the reference
enabled = ["native", "c", "cpp", "rust"]
# Library directories are resolved relative to this
root = "."

[languages.dirs]
# Defaults to native/<lang>
# c = "native/c"
# cpp = "native/cpp"
# rust = "target/release"

[output]
# Default output format: human, tsv, json, csv
format = "human"
# Directory for saved run documents
directory = "target/numbench"
# Save a JSON run document after each run
save_json = false
"#
        .to_string()
    }

    /// Parse a duration string ("3s", "500ms", "1.5") to seconds
    ///
    /// A bare number is taken as seconds.
    pub fn parse_duration(s: &str) -> Result<f64, ConfigError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::Duration(s.to_string()));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic() || *c == 'µ')
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| ConfigError::Duration(s.to_string()))?;

        let scale = match unit_part.to_lowercase().as_str() {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" | "" => 1.0,
            "m" | "min" => 60.0,
            _ => return Err(ConfigError::Duration(s.to_string())),
        };

        if value < 0.0 {
            return Err(ConfigError::Duration(s.to_string()));
        }
        Ok(value * scale)
    }
}
