// ABOUTME: Sync operations, their results, and the builder that creates them.
// ABOUTME: Also decodes the `{"hubsync": [...]}` content payload.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::SyncError;
use super::naming::{TargetLocation, generate_references};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::ImageReference;

/// One image to mirror. Built once, then consumed by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOperation {
    pub source: ImageReference,
    pub target: ImageReference,
    /// Target should be checked before syncing; off when `force` is set.
    pub validate_target: bool,
    /// Overwrite the target even if present.
    pub force: bool,
    /// Report intended names without calling the engine.
    pub dry_run: bool,
}

/// Outcome of one [`SyncOperation`].
#[derive(Debug)]
pub struct SyncResult {
    operation: SyncOperation,
    error: Option<SyncError>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    duration: Duration,
    detailed_logs: Vec<String>,
}

impl SyncResult {
    pub(crate) fn new(
        operation: SyncOperation,
        error: Option<SyncError>,
        started_at: DateTime<Utc>,
        duration: Duration,
        detailed_logs: Vec<String>,
    ) -> Self {
        let finished_at = started_at
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            operation,
            error,
            started_at,
            finished_at,
            duration,
            detailed_logs,
        }
    }

    pub fn operation(&self) -> &SyncOperation {
        &self.operation
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Set only when the operation failed.
    pub fn error(&self) -> Option<&SyncError> {
        self.error.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Step-by-step trace of what the operation did.
    pub fn detailed_logs(&self) -> &[String] {
        &self.detailed_logs
    }
}

/// Operations produced from a content list, plus how many entries were empty.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub operations: Vec<SyncOperation>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct HubsyncContent {
    hubsync: Vec<String>,
}

/// Decode the content payload and enforce the batch-size cap.
///
/// The whole batch is rejected when it holds more than `max_content` entries.
pub fn parse_content(content: &str, max_content: usize) -> Result<Vec<String>> {
    let parsed: HubsyncContent = serde_json::from_str(content)?;

    if parsed.hubsync.len() > max_content {
        return Err(Error::TooManyImages {
            count: parsed.hubsync.len(),
            max: max_content,
        });
    }

    Ok(parsed.hubsync)
}

/// Turn raw entries into operations, in input order. Empty entries are
/// counted as skipped and produce no operation.
pub fn build_operations(entries: &[String], config: &Config) -> BuildOutcome {
    let location = TargetLocation {
        repository: &config.repository,
        namespace: &config.namespace,
    };

    let mut outcome = BuildOutcome {
        operations: Vec::with_capacity(entries.len()),
        skipped: 0,
    };

    for (index, entry) in entries.iter().enumerate() {
        if entry.is_empty() {
            outcome.skipped += 1;
            tracing::warn!(
                index = index + 1,
                total = entries.len(),
                "empty image name skipped"
            );
            continue;
        }

        let (source, target) = generate_references(entry, location);
        tracing::debug!(%source, %target, "image mapping generated");

        outcome.operations.push(SyncOperation {
            source,
            target,
            validate_target: !config.force,
            force: config.force,
            dry_run: config.dry_run,
        });
    }

    outcome
}
