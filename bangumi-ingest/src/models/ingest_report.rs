//! Run results: per-record outcomes, per-stage statistics, run report

use super::ingest_state::{IngestState, StateTransition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a record did not reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterReason {
    /// Adult-flagged subject
    Nsfw,
    /// Person with type code 0
    InvalidPersonType,
    /// Relation names a subject that was never indexed
    UnknownSubject,
    UnknownPerson,
    UnknownCharacter,
}

/// Result of processing one record that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Written,
    Filtered(FilterReason),
}

/// **Per-stage statistics**
///
/// Display: "read N, written N, filtered N, failed N in T ms"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: IngestState,
    /// Records (or taxonomy entries) consumed, including dropped ones
    pub read: usize,
    pub written: usize,
    pub filtered: usize,
    /// Relation records whose write failed
    pub failed: usize,
    pub elapsed_ms: u64,
    /// Stage stopped at its record cap
    pub capped: bool,
}

impl StageStats {
    pub fn new(stage: IngestState) -> Self {
        Self {
            stage,
            read: 0,
            written: 0,
            filtered: 0,
            failed: 0,
            elapsed_ms: 0,
            capped: false,
        }
    }

    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Written => self.written += 1,
            RecordOutcome::Filtered(_) => self.filtered += 1,
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "read {}, written {}, filtered {}, failed {} in {} ms{}",
            self.read,
            self.written,
            self.filtered,
            self.failed,
            self.elapsed_ms,
            if self.capped { " (capped)" } else { "" }
        )
    }
}

/// Report of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub state: IngestState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Completed stages in execution order
    pub stages: Vec<StageStats>,
    pub transitions: Vec<StateTransition>,
}

impl IngestReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: IngestState::Pending,
            started_at: Utc::now(),
            ended_at: None,
            stages: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Move to `new_state`; terminal states stamp the end time
    pub fn transition_to(&mut self, new_state: IngestState) {
        let transition = StateTransition {
            run_id: self.run_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        tracing::debug!(
            run_id = %self.run_id,
            from = %transition.old_state,
            to = %transition.new_state,
            "State transition"
        );
        self.transitions.push(transition);
    }

    pub fn stage(&self, stage: IngestState) -> Option<&StageStats> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn total_failed(&self) -> usize {
        self.stages.iter().map(|s| s.failed).sum()
    }

    pub fn duration_ms(&self) -> i64 {
        self.ended_at
            .map(|end| (end - self.started_at).num_milliseconds())
            .unwrap_or(0)
    }
}

impl Default for IngestReport {
    fn default() -> Self {
        Self::new()
    }
}
