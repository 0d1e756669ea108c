// ABOUTME: Orchestrates one run: parse, build, pick a strategy, execute, aggregate, emit.
// ABOUTME: Collaborators are passed in; nothing is kept between runs.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::error::SyncError;
use super::executor::Executor;
use super::operation::{SyncResult, build_operations, parse_content};
use super::stats::SyncStatistics;
use super::strategy::Strategy;
use crate::config::Config;
use crate::error::Result;
use crate::output::{OutputWriter, RunReport, ScriptWriter};
use crate::runtime::ImageOps;

/// What a completed run produced.
#[derive(Debug)]
pub struct SyncOutcome {
    pub results: Vec<SyncResult>,
    pub stats: SyncStatistics,
    /// Set when the strategy stopped early; the results are then partial.
    pub interrupted: Option<SyncError>,
    pub correlation_id: String,
}

pub struct Syncer {
    config: Config,
    engine: Arc<dyn ImageOps>,
    writer: Box<dyn OutputWriter>,
}

impl Syncer {
    pub fn new(config: Config, engine: Arc<dyn ImageOps>, writer: Box<dyn OutputWriter>) -> Self {
        Self {
            config,
            engine,
            writer,
        }
    }

    /// Write the pull script to the configured output path.
    pub fn with_script_output(config: Config, engine: Arc<dyn ImageOps>) -> Self {
        let writer = ScriptWriter::new(&config.output_path, config.repository.clone());
        Self::new(config, engine, Box::new(writer))
    }

    /// Mirror every image in the configured content.
    ///
    /// The run is cancelled once `config.timeout` elapses; whatever finished
    /// by then is kept. Individual image failures are recorded in the outcome
    /// and never make this fail. Errors are limited to bad content and an unwritable output.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<SyncOutcome> {
        let correlation_id = format!(
            "sync-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let span = tracing::info_span!("sync", correlation_id = %correlation_id);

        self.run_inner(cancel, correlation_id).instrument(span).await
    }

    async fn run_inner(
        &self,
        cancel: &CancellationToken,
        correlation_id: String,
    ) -> Result<SyncOutcome> {
        let clock = Instant::now();

        let entries = parse_content(&self.config.content, self.config.max_content)?;
        tracing::info!(
            total_images = entries.len(),
            concurrency = self.config.concurrency,
            dry_run = self.config.dry_run,
            "starting image synchronization"
        );

        let built = build_operations(&entries, &self.config);
        let strategy = Strategy::for_concurrency(self.config.concurrency);
        tracing::info!(
            strategy = strategy.name(),
            operations = built.operations.len(),
            "executing sync"
        );

        let executor = Executor::new(Arc::clone(&self.engine), self.config.retry_policy());
        let budget = cancel.child_token();
        let execution = strategy.execute(&executor, built.operations, &budget);
        tokio::pin!(execution);

        // The budget cancels instead of dropping the execution so partial
        // results survive a timeout.
        let finished = tokio::select! {
            executed = &mut execution => Some(executed),
            _ = tokio::time::sleep(self.config.timeout) => None,
        };
        let executed = match finished {
            Some(executed) => executed,
            None => {
                tracing::warn!(timeout = ?self.config.timeout, "run timed out, cancelling remaining work");
                budget.cancel();
                execution.await
            }
        };

        let (results, interrupted) = match executed {
            Ok(results) => (results, None),
            Err((partial, err)) => {
                tracing::error!(error = %err, "sync stopped early, keeping partial results");
                (partial, Some(err))
            }
        };

        let stats = SyncStatistics {
            total_images: entries.len(),
            ..SyncStatistics::aggregate(&results, built.skipped, clock.elapsed())
        };

        self.writer.write(&RunReport {
            results: &results,
            stats: &stats,
            completed_at: Utc::now(),
            correlation_id: &correlation_id,
        })?;

        tracing::info!(
            total = stats.total_images,
            successful = stats.successful,
            failed = stats.failed,
            skipped = stats.skipped,
            duration_ms = stats.total_duration.as_millis() as u64,
            "image synchronization completed"
        );

        Ok(SyncOutcome {
            results,
            stats,
            interrupted,
            correlation_id,
        })
    }
}
