// ABOUTME: Runs a single sync operation: dry-run notice or pull, tag, push.
// ABOUTME: Shared by the standard and parallel strategies.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use super::error::{PullSnafu, PushSnafu, SyncError, TagSnafu, WorkerTag};
use super::operation::{SyncOperation, SyncResult};
use super::retry::{RetryPolicy, with_retry};
use crate::runtime::ImageOps;

/// Executes operations against one engine with one retry policy.
///
/// Cloning is cheap; each parallel worker holds its own clone.
#[derive(Clone)]
pub struct Executor {
    engine: Arc<dyn ImageOps>,
    policy: RetryPolicy,
}

impl Executor {
    pub fn new(engine: Arc<dyn ImageOps>, policy: RetryPolicy) -> Self {
        Self { engine, policy }
    }

    /// Run one operation to completion. Never fails: the outcome is data.
    ///
    /// `cancel` only cuts retry waits short; an engine call in flight runs to
    /// its own completion.
    pub async fn run(
        &self,
        operation: SyncOperation,
        cancel: &CancellationToken,
        worker: WorkerTag,
    ) -> SyncResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut trace = Trace::new(worker);

        let outcome = if operation.dry_run {
            trace.push(format!(
                "Dry run: would sync from {} to {}",
                operation.source, operation.target
            ));
            tracing::info!(source = %operation.source, target = %operation.target, "dry run, skipping engine calls");
            Ok(())
        } else {
            self.sync_image(&operation, cancel, worker, &mut trace).await
        };

        match &outcome {
            Ok(()) => tracing::info!(
                source = %operation.source,
                target = %operation.target,
                elapsed_ms = clock.elapsed().as_millis() as u64,
                "image synced"
            ),
            Err(err) => tracing::error!(
                source = %operation.source,
                target = %operation.target,
                error = %err,
                "image sync failed"
            ),
        }

        SyncResult::new(
            operation,
            outcome.err(),
            started_at,
            clock.elapsed(),
            trace.into_lines(),
        )
    }

    async fn sync_image(
        &self,
        operation: &SyncOperation,
        cancel: &CancellationToken,
        worker: WorkerTag,
        trace: &mut Trace,
    ) -> Result<(), SyncError> {
        let engine = &*self.engine;
        let source = &operation.source;
        let target = &operation.target;

        trace.push(format!("Pulling source image: {source}"));
        let pulled = with_retry(self.policy, cancel, "pull", source.full_name(), move || {
            engine.pull_image(source)
        })
        .await;
        if let Err(err) = &pulled {
            trace.push(format!("Pull failed: {err}"));
        }
        pulled.context(PullSnafu {
            image: source.full_name(),
            worker,
        })?;

        trace.push(format!("Tagging image: {source} -> {target}"));
        let tagged = engine.tag_image(source, target).await;
        if let Err(err) = &tagged {
            trace.push(format!("Tag failed: {err}"));
        }
        tagged.context(TagSnafu {
            image: source.full_name(),
            target: target.full_name(),
            worker,
        })?;

        trace.push(format!("Pushing target image: {target}"));
        let pushed = with_retry(self.policy, cancel, "push", target.full_name(), move || {
            engine.push_image(target)
        })
        .await;
        if let Err(err) = &pushed {
            trace.push(format!("Push failed: {err}"));
        }
        pushed.context(PushSnafu {
            image: target.full_name(),
            worker,
        })?;

        trace.push("Synchronization completed successfully".to_string());
        Ok(())
    }
}

/// Detailed log lines for one result, prefixed with the worker in parallel runs.
struct Trace {
    prefix: String,
    lines: Vec<String>,
}

impl Trace {
    fn new(worker: WorkerTag) -> Self {
        let prefix = match worker.0 {
            Some(id) => format!("Worker-{id}: "),
            None => String::new(),
        };
        Self {
            prefix,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push(format!("{}{line}", self.prefix));
    }

    fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
