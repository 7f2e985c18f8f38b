//! Entity phases: SUBJECTS, PERSONS, CHARACTERS
//!
//! Every record that reaches the store is also recorded in the reference
//! index, after the write succeeded. Errors are not isolated here: an unknown
//! code or a store failure aborts the run.

use super::statistics::StageTimer;
use super::IngestOrchestrator;
use crate::models::{FilterReason, IngestReport, IngestState, RecordOutcome};
use crate::services::jsonl_reader::JsonLinesReader;
use crate::services::reference_index::ReferenceIndexBuilder;
use bangumi_common::codes::{Career, CharacterRole, PersonType};
use bangumi_common::records::{CharacterRecord, JsonRecord, PersonRecord, SubjectRecord};
use bangumi_common::{Category, LookupError, Result};

impl IngestOrchestrator {
    /// Reader for `T`'s dump with the configured cap applied
    pub(super) async fn open_reader<T: JsonRecord>(&self) -> Result<JsonLinesReader<T>> {
        let limit = self.settings.limits.for_kind(T::KIND);
        if let Some(limit) = limit {
            tracing::info!(kind = %T::KIND, limit, "Record cap active");
        }
        Ok(JsonLinesReader::open(&self.settings.data_folder)
            .await?
            .with_limit(limit))
    }

    /// SUBJECTS - subject nodes, platform membership
    pub(super) async fn phase_subjects(
        &self,
        report: &mut IngestReport,
        index: &mut ReferenceIndexBuilder,
    ) -> Result<()> {
        report.transition_to(IngestState::Subjects);
        let mut timer = StageTimer::start(IngestState::Subjects);
        let mut reader = self.open_reader::<SubjectRecord>().await?;

        tracing::info!("Inserting subjects from {}", reader.path().display());

        while let Some((_, subject)) = reader.next_record().await? {
            timer.read();
            let outcome = self.load_subject(&subject, index).await?;
            timer.record(outcome);
        }

        timer.capped(reader.limit_reached());
        report.stages.push(timer.finish());
        Ok(())
    }

    async fn load_subject(
        &self,
        subject: &SubjectRecord,
        index: &mut ReferenceIndexBuilder,
    ) -> Result<RecordOutcome> {
        if subject.nsfw {
            tracing::trace!(subject_id = subject.id, "Skipping adult subject");
            return Ok(RecordOutcome::Filtered(FilterReason::Nsfw));
        }

        let category = Category::try_from(subject.category)?;
        self.writer().write_subject(subject, category).await?;

        index.record_subject(subject.id, category, subject.display_name());
        Ok(RecordOutcome::Written)
    }

    /// PERSONS - person nodes; type 0 is dropped
    pub(super) async fn phase_persons(
        &self,
        report: &mut IngestReport,
        index: &mut ReferenceIndexBuilder,
    ) -> Result<()> {
        report.transition_to(IngestState::Persons);
        let mut timer = StageTimer::start(IngestState::Persons);
        let mut reader = self.open_reader::<PersonRecord>().await?;

        tracing::info!("Inserting persons from {}", reader.path().display());

        while let Some((_, person)) = reader.next_record().await? {
            timer.read();
            let outcome = self.load_person(&person, index).await?;
            timer.record(outcome);
        }

        timer.capped(reader.limit_reached());
        report.stages.push(timer.finish());
        Ok(())
    }

    async fn load_person(
        &self,
        person: &PersonRecord,
        index: &mut ReferenceIndexBuilder,
    ) -> Result<RecordOutcome> {
        let Some(person_type) = PersonType::from_code(person.person_type)? else {
            tracing::warn!(
                person_id = person.id,
                name = %person.name,
                "Person has type 0, skipping"
            );
            return Ok(RecordOutcome::Filtered(FilterReason::InvalidPersonType));
        };

        let careers = person
            .career
            .iter()
            .map(|code| Career::try_from(code.as_str()))
            .collect::<std::result::Result<Vec<_>, LookupError>>()?;

        self.writer().write_person(person, person_type, &careers).await?;

        index.record_person(person.id);
        Ok(RecordOutcome::Written)
    }

    /// CHARACTERS - character nodes
    pub(super) async fn phase_characters(
        &self,
        report: &mut IngestReport,
        index: &mut ReferenceIndexBuilder,
    ) -> Result<()> {
        report.transition_to(IngestState::Characters);
        let mut timer = StageTimer::start(IngestState::Characters);
        let mut reader = self.open_reader::<CharacterRecord>().await?;

        tracing::info!("Inserting characters from {}", reader.path().display());

        while let Some((_, character)) = reader.next_record().await? {
            timer.read();
            let role = CharacterRole::try_from(character.role)?;
            self.writer().write_character(&character, role).await?;

            index.record_character(character.id, &character.name);
            timer.record(RecordOutcome::Written);
        }

        timer.capped(reader.limit_reached());
        report.stages.push(timer.finish());
        Ok(())
    }
}
