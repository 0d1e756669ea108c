// ABOUTME: Execution strategies for a batch of sync operations.
// ABOUTME: Standard runs them in order; Parallel uses a bounded pool of worker tasks.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::error::{SyncError, WorkerTag};
use super::executor::Executor;
use super::operation::{SyncOperation, SyncResult};

/// Worker count used when a parallel strategy is asked for zero workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Results of a batch. The error side carries the partial results collected
/// before the run was cancelled.
pub type StrategyResult = Result<Vec<SyncResult>, (Vec<SyncResult>, SyncError)>;

/// How a batch is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One operation at a time, results in input order.
    Standard,
    /// Up to `concurrency` operations at once, results in completion order.
    Parallel { concurrency: usize },
}

impl Strategy {
    /// Parallel when more than one worker is configured, otherwise standard.
    pub fn for_concurrency(concurrency: usize) -> Self {
        if concurrency > 1 {
            Strategy::Parallel { concurrency }
        } else {
            Strategy::Standard
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Standard => "standard",
            Strategy::Parallel { .. } => "parallel",
        }
    }

    /// Execute every operation, or as many as run before `cancel` fires.
    ///
    /// Individual failures are recorded in their results and never stop the
    /// batch.
    pub async fn execute(
        &self,
        executor: &Executor,
        operations: Vec<SyncOperation>,
        cancel: &CancellationToken,
    ) -> StrategyResult {
        match *self {
            Strategy::Standard => run_standard(executor, operations, cancel).await,
            Strategy::Parallel { concurrency } => {
                let workers = if concurrency == 0 {
                    DEFAULT_WORKERS
                } else {
                    concurrency
                };
                run_parallel(executor, operations, cancel, workers).await
            }
        }
    }
}

async fn run_standard(
    executor: &Executor,
    operations: Vec<SyncOperation>,
    cancel: &CancellationToken,
) -> StrategyResult {
    let total = operations.len();
    let mut results = Vec::with_capacity(total);

    for operation in operations {
        if cancel.is_cancelled() {
            let completed = results.len();
            tracing::warn!(completed, total, "run cancelled, stopping standard sync");
            return Err((
                results,
                SyncError::Cancelled {
                    stage: "standard",
                    completed,
                    total,
                },
            ));
        }

        results.push(executor.run(operation, cancel, WorkerTag::default()).await);
    }

    Ok(results)
}

async fn run_parallel(
    executor: &Executor,
    operations: Vec<SyncOperation>,
    cancel: &CancellationToken,
    workers: usize,
) -> StrategyResult {
    let total = operations.len();
    let queue = Arc::new(Mutex::new(VecDeque::from(operations)));
    let (tx, mut rx) = mpsc::channel(total.max(1));

    tracing::debug!(workers, total, "starting worker pool");

    let mut pool = JoinSet::new();
    for id in 0..workers.min(total.max(1)) {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        let executor = executor.clone();
        let cancel = cancel.clone();

        pool.spawn(async move {
            let worker = WorkerTag(Some(id));
            loop {
                if cancel.is_cancelled() {
                    tracing::debug!(worker = id, "cancelled, worker stopping");
                    break;
                }
                let Some(operation) = queue.lock().pop_front() else {
                    break;
                };
                tracing::debug!(worker = id, source = %operation.source, "worker picked up operation");

                let result = executor.run(operation, &cancel, worker).await;
                if tx.send(result).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(err) = joined {
            tracing::error!(error = %err, "sync worker terminated abnormally");
        }
    }

    if cancel.is_cancelled() {
        let completed = results.len();
        tracing::warn!(completed, total, "run cancelled, returning partial parallel results");
        return Err((
            results,
            SyncError::Cancelled {
                stage: "parallel",
                completed,
                total,
            },
        ));
    }

    Ok(results)
}
