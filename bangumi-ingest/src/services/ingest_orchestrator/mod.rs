//! Ingestion orchestrator
//!
//! Drives one full rebuild of the graph from an archive dump.
//!
//! # State Progression
//! CLEAR → PLATFORMS → CONSTRAINTS → SUBJECTS → PERSONS → CHARACTERS →
//! SUBJECT_RELATIONS → SUBJECT_PERSON_RELATIONS → SUBJECT_CHARACTER_RELATIONS →
//! PERSON_CHARACTER_RELATIONS → DONE
//!
//! # Architecture
//! Each state is handled by a `phase_*` method:
//!
//! - **phase_setup**: CLEAR, PLATFORMS, CONSTRAINTS
//! - **phase_entities**: SUBJECTS, PERSONS, CHARACTERS. Fill the reference
//!   index; any error aborts the run.
//! - **phase_relations**: the four relation stages. Read the frozen reference
//!   index; a failing record is logged and counted, the stage continues.
//!
//! Stages run strictly one after another, one record at a time.

use crate::db::{GraphStore, GraphWriter};
use crate::models::{IngestReport, IngestState};
use crate::services::reference_index::ReferenceIndexBuilder;
use bangumi_common::config::RecordLimits;
use bangumi_common::records::{
    PersonCharacterRecord, SubjectCharacterRecord, SubjectPersonRecord, SubjectRelationRecord,
};
use bangumi_common::taxonomy::Taxonomy;
use bangumi_common::Error;
use std::path::PathBuf;
use std::sync::Arc;

mod phase_entities;
mod phase_relations;
mod phase_setup;
mod statistics;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Folder holding the seven `.jsonlines` dumps
    pub data_folder: PathBuf,
    /// Optional per-kind record caps
    pub limits: RecordLimits,
}

/// A run that stopped before DONE
#[derive(Debug, thiserror::Error)]
#[error("Ingestion failed during {stage}: {source}")]
pub struct IngestFailure {
    /// Stage that was running when the error surfaced
    pub stage: IngestState,
    /// Report up to the failure (state FAILED)
    pub report: Box<IngestReport>,
    #[source]
    pub source: Error,
}

/// Ingestion orchestrator service
pub struct IngestOrchestrator {
    store: Arc<dyn GraphStore>,
    taxonomy: Taxonomy,
    settings: IngestSettings,
}

impl IngestOrchestrator {
    pub fn new(store: Arc<dyn GraphStore>, taxonomy: Taxonomy, settings: IngestSettings) -> Self {
        Self {
            store,
            taxonomy,
            settings,
        }
    }

    /// Execute the complete pipeline
    ///
    /// **Destructive:** the store is cleared first.
    pub async fn run(&self) -> Result<IngestReport, IngestFailure> {
        let mut report = IngestReport::new();

        tracing::info!(
            run_id = %report.run_id,
            data_folder = %self.settings.data_folder.display(),
            "Starting ingestion run"
        );

        match self.execute(&mut report).await {
            Ok(()) => {
                report.transition_to(IngestState::Done);
                tracing::info!(
                    run_id = %report.run_id,
                    duration_ms = report.duration_ms(),
                    failed_records = report.total_failed(),
                    "Ingestion run completed"
                );
                Ok(report)
            }
            Err(source) => {
                let stage = report.state;
                tracing::error!(
                    run_id = %report.run_id,
                    stage = %stage,
                    error = %source,
                    "Ingestion run aborted"
                );
                report.transition_to(IngestState::Failed);
                Err(IngestFailure {
                    stage,
                    report: Box::new(report),
                    source,
                })
            }
        }
    }

    fn writer(&self) -> GraphWriter<'_> {
        GraphWriter::new(self.store.as_ref())
    }

    async fn execute(&self, report: &mut IngestReport) -> bangumi_common::Result<()> {
        // Setup
        self.phase_clear(report).await?;
        self.phase_platforms(report).await?;
        self.phase_constraints(report).await?;

        // Entities
        let mut builder = ReferenceIndexBuilder::new();
        self.phase_subjects(report, &mut builder).await?;
        self.phase_persons(report, &mut builder).await?;
        self.phase_characters(report, &mut builder).await?;

        // Relations
        let index = builder.freeze();
        self.phase_relations::<SubjectRelationRecord>(report, &index).await?;
        self.phase_relations::<SubjectPersonRecord>(report, &index).await?;
        self.phase_relations::<SubjectCharacterRecord>(report, &index).await?;
        self.phase_relations::<PersonCharacterRecord>(report, &index).await?;

        Ok(())
    }
}
