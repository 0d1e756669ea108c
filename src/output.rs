// ABOUTME: Renders run results: the pull script written to disk and the console summary.
// ABOUTME: The console summary supports normal, quiet (CI), and JSON output modes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use humantime_serde::re::humantime::format_duration;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::sync::{SyncResult, SyncStatistics};

/// Everything a writer needs to render one run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport<'a> {
    pub results: &'a [SyncResult],
    pub stats: &'a SyncStatistics,
    pub completed_at: DateTime<Utc>,
    pub correlation_id: &'a str,
}

/// Destination for the results of a run.
pub trait OutputWriter: Send + Sync {
    fn write(&self, report: &RunReport<'_>) -> Result<()>;
}

/// Writes a shell-style script of `docker pull` lines for the mirrored images.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    path: PathBuf,
    repository: String,
}

impl ScriptWriter {
    /// `repository` adds a login hint when non-empty.
    pub fn new(path: impl Into<PathBuf>, repository: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            repository: repository.into(),
        }
    }

    pub fn render(&self, report: &RunReport<'_>) -> String {
        let mut script = String::new();
        let stats = report.stats;

        if !self.repository.is_empty() {
            let _ = write!(
                script,
                "# If your repository is private, please login first...\n\
                 # docker login {} --username={{your username}}\n\n",
                self.repository
            );
        }

        let _ = writeln!(
            script,
            "# HubSync completed at {}",
            report.completed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(
            script,
            "# Summary: {} successful, {} failed, {} skipped",
            stats.successful, stats.failed, stats.skipped
        );
        let _ = writeln!(
            script,
            "# Total duration: {}",
            human_duration(stats.total_duration)
        );
        let _ = writeln!(script, "# Correlation ID: {}", report.correlation_id);

        for result in report.results.iter().filter(|r| r.success()) {
            let operation = result.operation();
            let _ = write!(
                script,
                "\ndocker pull {} # (from {} in {})\n",
                operation.target,
                operation.source,
                human_duration(result.duration())
            );
        }

        if stats.failed > 0 {
            script.push_str("\n# The following images failed to sync:\n");
            for result in report.results.iter() {
                if let Some(err) = result.error() {
                    let operation = result.operation();
                    let _ = writeln!(
                        script,
                        "# {} -> {} ({err})",
                        operation.source, operation.target
                    );
                }
            }
        }

        script
    }
}

impl OutputWriter for ScriptWriter {
    fn write(&self, report: &RunReport<'_>) -> Result<()> {
        std::fs::write(&self.path, self.render(report)).map_err(|source| Error::Output {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path.display(),
            count = report.results.len(),
            successful = report.stats.successful,
            failed = report.stats.failed,
            skipped = report.stats.skipped,
            "output file written"
        );
        Ok(())
    }
}

/// Millisecond precision is enough for a human reader.
fn human_duration(duration: Duration) -> String {
    let millis = Duration::from_millis(duration.as_millis() as u64);
    if millis.is_zero() {
        "0ms".to_string()
    } else {
        format_duration(millis).to_string()
    }
}

/// Console mode for the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly summary with one line per failure.
    Normal,
    /// Only the counts, for CI logs.
    Quiet,
    /// One JSON object for scripting.
    Json,
}

/// Prints the end-of-run summary and fatal errors to the console.
pub struct Console {
    mode: OutputMode,
}

impl Console {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn summary(&self, stats: &SyncStatistics, output_path: &Path) {
        match self.mode {
            OutputMode::Normal => {
                println!(
                    "Synced {} of {} images ({} failed, {} skipped) in {}",
                    stats.successful,
                    stats.total_images,
                    stats.failed,
                    stats.skipped,
                    human_duration(stats.total_duration)
                );
                println!("Pull commands written to {}", output_path.display());
            }
            OutputMode::Quiet => {
                println!(
                    "{} successful, {} failed, {} skipped",
                    stats.successful, stats.failed, stats.skipped
                );
            }
            OutputMode::Json => {
                let event = JsonSummary {
                    event: "completed",
                    total_images: stats.total_images,
                    successful: stats.successful,
                    failed: stats.failed,
                    skipped: stats.skipped,
                    duration_secs: stats.total_duration.as_secs_f64(),
                    output: output_path,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => {
                let event = JsonError {
                    event: "error",
                    message,
                };
                match serde_json::to_string(&event) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("Error: {message}"),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    event: &'a str,
    total_images: usize,
    successful: usize,
    failed: usize,
    skipped: usize,
    duration_secs: f64,
    output: &'a Path,
}

#[derive(Serialize)]
struct JsonError<'a> {
    event: &'a str,
    message: &'a str,
}
