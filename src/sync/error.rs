// ABOUTME: Per-operation and strategy-level sync errors with SNAFU context selectors.
// ABOUTME: Messages name the failed step, the image and, in parallel runs, the worker.

use snafu::Snafu;
use std::fmt;

use super::retry::RetryError;
use crate::runtime::ImageError;

/// Which worker ran an operation; empty for the sequential strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTag(pub Option<usize>);

impl fmt::Display for WorkerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "worker {id} "),
            None => Ok(()),
        }
    }
}

/// Why one image failed to sync, or why a strategy stopped early.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SyncError {
    #[snafu(display("{worker}failed to pull source image {image}: {source}"))]
    Pull {
        image: String,
        worker: WorkerTag,
        source: RetryError,
    },

    #[snafu(display("{worker}failed to tag image {image} as {target}: {source}"))]
    Tag {
        image: String,
        target: String,
        worker: WorkerTag,
        source: ImageError,
    },

    #[snafu(display("{worker}failed to push target image {image}: {source}"))]
    Push {
        image: String,
        worker: WorkerTag,
        source: RetryError,
    },

    #[snafu(display("run cancelled during {stage} sync after {completed} of {total} operations"))]
    Cancelled {
        stage: &'static str,
        completed: usize,
        total: usize,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    /// A pull, tag or push step failed for one image.
    Operation,
    /// The run was cancelled or timed out.
    Context,
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::Pull { source, .. } | SyncError::Push { source, .. }
                if source.is_cancelled() =>
            {
                SyncErrorKind::Context
            }
            SyncError::Cancelled { .. } => SyncErrorKind::Context,
            SyncError::Pull { .. } | SyncError::Tag { .. } | SyncError::Push { .. } => {
                SyncErrorKind::Operation
            }
        }
    }
}
