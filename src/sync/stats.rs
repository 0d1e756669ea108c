// ABOUTME: Aggregate counts and timings for one run.

use std::time::Duration;

use super::operation::SyncResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatistics {
    pub total_images: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Wall-clock time of the whole run.
    pub total_duration: Duration,
    /// Zero when nothing succeeded.
    pub average_duration: Duration,
}

impl SyncStatistics {
    /// Reduce results to counts. `skipped` comes from the build stage, since
    /// skipped entries never produce a result.
    pub fn aggregate(results: &[SyncResult], skipped: usize, wall_clock: Duration) -> Self {
        let successful = results.iter().filter(|r| r.success()).count();
        let failed = results.len() - successful;

        let average_duration = match u32::try_from(successful) {
            Ok(count) if count > 0 => wall_clock / count,
            _ => Duration::ZERO,
        };

        Self {
            total_images: results.len() + skipped,
            successful,
            failed,
            skipped,
            total_duration: wall_clock,
            average_duration,
        }
    }
}
