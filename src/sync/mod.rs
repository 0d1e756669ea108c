// ABOUTME: Image mirroring engine: naming, operations, retry, strategies, orchestration.
// ABOUTME: Only `Syncer` talks to the output writer; everything else is pure or engine-bound.

mod error;
mod executor;
pub mod naming;
mod operation;
mod retry;
mod stats;
mod strategy;
mod syncer;

pub use error::{SyncError, SyncErrorKind, WorkerTag};
pub use executor::Executor;
pub use naming::{TargetLocation, generate_references};
pub use operation::{BuildOutcome, SyncOperation, SyncResult, build_operations, parse_content};
pub use retry::{RetryError, RetryPolicy, with_retry};
pub use stats::SyncStatistics;
pub use strategy::{DEFAULT_WORKERS, Strategy, StrategyResult};
pub use syncer::{SyncOutcome, Syncer};
