//! Stage timing and counters
//!
//! Every stage runs inside a [`StageTimer`]; finishing it logs the stage
//! summary at INFO and yields the [`StageStats`] kept in the run report.

use crate::models::{IngestState, RecordOutcome, StageStats};
use std::time::Instant;

pub(super) struct StageTimer {
    stats: StageStats,
    started: Instant,
}

impl StageTimer {
    pub(super) fn start(stage: IngestState) -> Self {
        Self {
            stats: StageStats::new(stage),
            started: Instant::now(),
        }
    }

    pub(super) fn read(&mut self) {
        self.stats.read += 1;
    }

    pub(super) fn record(&mut self, outcome: RecordOutcome) {
        self.stats.record(outcome);
    }

    pub(super) fn failed(&mut self) {
        self.stats.failed += 1;
    }

    pub(super) fn capped(&mut self, capped: bool) {
        self.stats.capped = capped;
    }

    pub(super) fn finish(mut self) -> StageStats {
        self.stats.elapsed_ms = self.started.elapsed().as_millis() as u64;

        tracing::info!(
            stage = %self.stats.stage,
            read = self.stats.read,
            written = self.stats.written,
            filtered = self.stats.filtered,
            failed = self.stats.failed,
            elapsed_ms = self.stats.elapsed_ms,
            "{} completed: {}",
            self.stats.stage,
            self.stats.display_string()
        );

        self.stats
    }
}
