//! Setup phases: CLEAR, PLATFORMS, CONSTRAINTS

use super::statistics::StageTimer;
use super::IngestOrchestrator;
use crate::db::graph_store::constraint_name;
use crate::db::NodeLabel;
use crate::models::{IngestReport, IngestState, RecordOutcome};
use bangumi_common::Result;

/// Labels whose natural key must be unique
const CONSTRAINED_LABELS: [NodeLabel; 3] =
    [NodeLabel::Subject, NodeLabel::Person, NodeLabel::Character];

impl IngestOrchestrator {
    /// CLEAR - delete every node and edge
    pub(super) async fn phase_clear(&self, report: &mut IngestReport) -> Result<()> {
        report.transition_to(IngestState::Clear);
        let timer = StageTimer::start(IngestState::Clear);

        tracing::info!("Clearing graph store...");
        self.store.clear_all().await?;

        report.stages.push(timer.finish());
        Ok(())
    }

    /// PLATFORMS - one node per (category, platform id) of the platform table
    pub(super) async fn phase_platforms(&self, report: &mut IngestReport) -> Result<()> {
        report.transition_to(IngestState::Platforms);
        let mut timer = StageTimer::start(IngestState::Platforms);
        let writer = self.writer();

        for (category, platforms) in self.taxonomy.platforms.iter() {
            for platform in platforms.values() {
                timer.read();
                writer.write_platform(category, platform).await?;
                timer.record(RecordOutcome::Written);
            }
        }

        report.stages.push(timer.finish());
        Ok(())
    }

    /// CONSTRAINTS - create the missing uniqueness constraints
    ///
    /// Existing constraints are looked up by name and left alone, so this is
    /// safe on a store that already went through a run.
    pub(super) async fn phase_constraints(&self, report: &mut IngestReport) -> Result<()> {
        report.transition_to(IngestState::Constraints);
        let mut timer = StageTimer::start(IngestState::Constraints);

        for label in CONSTRAINED_LABELS {
            timer.read();
            let name = constraint_name(label);

            if self.store.has_constraint(&name).await? {
                tracing::debug!(constraint = %name, "Constraint already exists");
                continue;
            }

            self.store.create_unique_constraint(&name, label).await?;
            tracing::info!(constraint = %name, label = %label, "Created uniqueness constraint");
            timer.record(RecordOutcome::Written);
        }

        report.stages.push(timer.finish());
        Ok(())
    }
}
