//! JSON Output and Run Persistence

use crate::records::{RunRecord, normalize_records};
use chrono::{DateTime, Local, Utc};
use numbench_core::{BenchmarkSuite, FormatOptions, ReportTable, Reporter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pretty JSON renderer, one document per table
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, table: &ReportTable) -> String {
        serde_json::to_string_pretty(table).unwrap_or_else(|e| {
            tracing::error!(
                benchmark = %table.title,
                error = %e,
                "Failed to serialize report table"
            );
            String::new()
        })
    }
}

/// Failure writing a run document
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    /// Run identifier
    pub run_id: String,
    /// When the document was built
    pub timestamp: DateTime<Utc>,
    /// numbench version
    pub version: String,
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Effective configuration for the run
    pub config: serde_json::Value,
}

/// Everything recorded about one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Metadata
    pub meta: RunMeta,
    /// Wide tables, one per benchmark
    pub tables: Vec<ReportTable>,
    /// Long-form records across all tables
    pub records: Vec<RunRecord>,
}

impl RunReport {
    /// Build a run document from already-shaped tables and records
    pub fn new(
        run_id: impl Into<String>,
        config: serde_json::Value,
        tables: Vec<ReportTable>,
        records: Vec<RunRecord>,
    ) -> Self {
        Self {
            meta: RunMeta {
                run_id: run_id.into(),
                timestamp: Utc::now(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                config,
            },
            tables,
            records,
        }
    }

    /// Build a run document for every benchmark in `suite`
    pub fn from_suite(
        run_id: impl Into<String>,
        config: serde_json::Value,
        suite: &BenchmarkSuite,
        options: &FormatOptions,
    ) -> Self {
        let run_id = run_id.into();
        let records = suite
            .benchmarks()
            .iter()
            .flat_map(|b| normalize_records(b, &run_id))
            .collect();
        Self::new(run_id, config, suite.reports(options), records)
    }

    /// Write as `<dir>/<run_id>.json`, creating `dir` if needed
    pub fn save(&self, dir: &Path) -> Result<PathBuf, PersistError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.meta.run_id));
        std::fs::write(&path, generate_json_report(self)?)?;
        tracing::info!(path = %path.display(), records = self.records.len(), "Saved run report");
        Ok(path)
    }

    /// Read a document written by [`save`](Self::save)
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Generate a prettified JSON run document.
pub fn generate_json_report(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// `{prefix}_{YYYYmmdd_HHMMSS}` in local time
pub fn make_run_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}
