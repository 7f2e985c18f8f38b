//! Relation phases: SUBJECT_RELATIONS, SUBJECT_PERSON_RELATIONS,
//! SUBJECT_CHARACTER_RELATIONS, PERSON_CHARACTER_RELATIONS
//!
//! Per record: filter against the frozen reference index, resolve the label,
//! merge the edge(s). A record that fails is logged with its ids and counted;
//! the stage moves on to the next line. Only reading the file (I/O, decode)
//! can abort a relation stage.

use super::statistics::StageTimer;
use super::IngestOrchestrator;
use crate::models::{FilterReason, IngestReport, IngestState, RecordOutcome};
use crate::services::label_resolver::{role_performance_label, LabelResolver};
use crate::services::reference_index::ReferenceIndex;
use async_trait::async_trait;
use bangumi_common::codes::SubjectCharacterType;
use bangumi_common::records::{
    JsonRecord, PersonCharacterRecord, SubjectCharacterRecord, SubjectPersonRecord,
    SubjectRelationRecord,
};
use bangumi_common::{Error, Result};

/// A relation record that knows how to load itself
#[async_trait]
pub(super) trait RelationRecord: JsonRecord + Sync {
    /// Filter, resolve and write one record
    async fn load(
        &self,
        orchestrator: &IngestOrchestrator,
        index: &ReferenceIndex,
    ) -> Result<RecordOutcome>;

    /// ERROR log line carrying the record's ids
    fn log_failure(&self, line: usize, error: &Error);
}

fn filtered(reason: FilterReason) -> Result<RecordOutcome> {
    Ok(RecordOutcome::Filtered(reason))
}

impl IngestOrchestrator {
    /// One relation stage over the dump of `T`
    pub(super) async fn phase_relations<T: RelationRecord>(
        &self,
        report: &mut IngestReport,
        index: &ReferenceIndex,
    ) -> Result<()> {
        let stage = IngestState::for_kind(T::KIND);
        report.transition_to(stage);
        let mut timer = StageTimer::start(stage);
        let mut reader = self.open_reader::<T>().await?;

        tracing::info!("Inserting {} from {}", T::KIND, reader.path().display());

        while let Some((line, record)) = reader.next_record().await? {
            timer.read();
            match record.load(self, index).await {
                Ok(outcome) => timer.record(outcome),
                Err(e) => {
                    record.log_failure(line, &e);
                    timer.failed();
                }
            }
        }

        timer.capped(reader.limit_reached());
        report.stages.push(timer.finish());
        Ok(())
    }
}

#[async_trait]
impl RelationRecord for SubjectRelationRecord {
    async fn load(
        &self,
        orchestrator: &IngestOrchestrator,
        index: &ReferenceIndex,
    ) -> Result<RecordOutcome> {
        let (Some(_), Some(related_category)) = (
            index.subject_category(self.subject_id),
            index.subject_category(self.related_subject_id),
        ) else {
            tracing::trace!(
                subject_id = self.subject_id,
                related_subject_id = self.related_subject_id,
                "Subject relation filtered: unknown subject"
            );
            return filtered(FilterReason::UnknownSubject);
        };

        let label = LabelResolver::new(&orchestrator.taxonomy)
            .subject_relation_label(related_category, self.relation_type)?;

        let created = orchestrator.writer().write_subject_relation(self, &label).await?;
        if !created {
            tracing::trace!(
                subject_id = self.subject_id,
                related_subject_id = self.related_subject_id,
                "Subject relation already present"
            );
        }
        Ok(RecordOutcome::Written)
    }

    fn log_failure(&self, line: usize, error: &Error) {
        tracing::error!(
            line,
            subject_id = self.subject_id,
            related_subject_id = self.related_subject_id,
            relation_type = self.relation_type,
            error = %error,
            "Failed to insert subject relation"
        );
    }
}

#[async_trait]
impl RelationRecord for SubjectPersonRecord {
    async fn load(
        &self,
        orchestrator: &IngestOrchestrator,
        index: &ReferenceIndex,
    ) -> Result<RecordOutcome> {
        let Some(subject_category) = index.subject_category(self.subject_id) else {
            tracing::trace!(
                subject_id = self.subject_id,
                person_id = self.person_id,
                "Subject-person relation filtered: unknown subject"
            );
            return filtered(FilterReason::UnknownSubject);
        };
        if !index.has_person(self.person_id) {
            tracing::trace!(
                subject_id = self.subject_id,
                person_id = self.person_id,
                "Subject-person relation filtered: unknown person"
            );
            return filtered(FilterReason::UnknownPerson);
        }

        let label = LabelResolver::new(&orchestrator.taxonomy)
            .staff_position_label(subject_category, self.position)?;

        orchestrator.writer().write_subject_person(self, &label).await?;
        Ok(RecordOutcome::Written)
    }

    fn log_failure(&self, line: usize, error: &Error) {
        tracing::error!(
            line,
            subject_id = self.subject_id,
            person_id = self.person_id,
            position = self.position,
            error = %error,
            "Failed to insert subject-person relation"
        );
    }
}

#[async_trait]
impl RelationRecord for SubjectCharacterRecord {
    async fn load(
        &self,
        orchestrator: &IngestOrchestrator,
        index: &ReferenceIndex,
    ) -> Result<RecordOutcome> {
        if !index.has_subject(self.subject_id) {
            tracing::trace!(
                subject_id = self.subject_id,
                character_id = self.character_id,
                "Subject-character relation filtered: unknown subject"
            );
            return filtered(FilterReason::UnknownSubject);
        }
        if !index.has_character(self.character_id) {
            tracing::trace!(
                subject_id = self.subject_id,
                character_id = self.character_id,
                "Subject-character relation filtered: unknown character"
            );
            return filtered(FilterReason::UnknownCharacter);
        }

        let appearance = SubjectCharacterType::try_from(self.appearance)?;
        orchestrator
            .writer()
            .write_character_appearance(self, appearance)
            .await?;
        Ok(RecordOutcome::Written)
    }

    fn log_failure(&self, line: usize, error: &Error) {
        tracing::error!(
            line,
            subject_id = self.subject_id,
            character_id = self.character_id,
            error = %error,
            "Failed to insert subject-character relation"
        );
    }
}

#[async_trait]
impl RelationRecord for PersonCharacterRecord {
    async fn load(
        &self,
        orchestrator: &IngestOrchestrator,
        index: &ReferenceIndex,
    ) -> Result<RecordOutcome> {
        if !index.has_person(self.person_id) {
            tracing::trace!(
                person_id = self.person_id,
                character_id = self.character_id,
                subject_id = self.subject_id,
                "Person-character relation filtered: unknown person"
            );
            return filtered(FilterReason::UnknownPerson);
        }
        let Some(subject_name) = index.subject_name(self.subject_id) else {
            tracing::trace!(
                person_id = self.person_id,
                character_id = self.character_id,
                subject_id = self.subject_id,
                "Person-character relation filtered: unknown subject"
            );
            return filtered(FilterReason::UnknownSubject);
        };
        let Some(character_name) = index.character_name(self.character_id) else {
            tracing::trace!(
                person_id = self.person_id,
                character_id = self.character_id,
                subject_id = self.subject_id,
                "Person-character relation filtered: unknown character"
            );
            return filtered(FilterReason::UnknownCharacter);
        };

        let label = role_performance_label(character_name, subject_name);
        orchestrator
            .writer()
            .write_role_performance(self, &label)
            .await?;
        Ok(RecordOutcome::Written)
    }

    fn log_failure(&self, line: usize, error: &Error) {
        tracing::error!(
            line,
            person_id = self.person_id,
            character_id = self.character_id,
            subject_id = self.subject_id,
            error = %error,
            "Failed to insert person-character relation"
        );
    }
}
