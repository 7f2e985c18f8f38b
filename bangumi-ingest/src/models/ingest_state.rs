//! Ingestion state machine
//!
//! PENDING → CLEAR → PLATFORMS → CONSTRAINTS → SUBJECTS → PERSONS → CHARACTERS →
//! SUBJECT_RELATIONS → SUBJECT_PERSON_RELATIONS → SUBJECT_CHARACTER_RELATIONS →
//! PERSON_CHARACTER_RELATIONS → DONE
//!
//! Any stage can end in FAILED.

use bangumi_common::records::RecordKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ingestion run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestState {
    /// Report created, no stage started yet
    Pending,
    /// Delete every node and edge
    Clear,
    /// Platform nodes from the taxonomy
    Platforms,
    /// Uniqueness constraints on Subject, Person, Character
    Constraints,
    Subjects,
    Persons,
    Characters,
    SubjectRelations,
    SubjectPersonRelations,
    SubjectCharacterRelations,
    PersonCharacterRelations,
    /// Run finished
    Done,
    /// Run aborted by an entity-stage or setup error
    Failed,
}

impl IngestState {
    /// The file stage that reads `kind`
    pub fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Subject => IngestState::Subjects,
            RecordKind::Person => IngestState::Persons,
            RecordKind::Character => IngestState::Characters,
            RecordKind::SubjectRelation => IngestState::SubjectRelations,
            RecordKind::SubjectPerson => IngestState::SubjectPersonRelations,
            RecordKind::SubjectCharacter => IngestState::SubjectCharacterRelations,
            RecordKind::PersonCharacter => IngestState::PersonCharacterRelations,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, IngestState::Done | IngestState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IngestState::Pending => "PENDING",
            IngestState::Clear => "CLEAR",
            IngestState::Platforms => "PLATFORMS",
            IngestState::Constraints => "CONSTRAINTS",
            IngestState::Subjects => "SUBJECTS",
            IngestState::Persons => "PERSONS",
            IngestState::Characters => "CHARACTERS",
            IngestState::SubjectRelations => "SUBJECT_RELATIONS",
            IngestState::SubjectPersonRelations => "SUBJECT_PERSON_RELATIONS",
            IngestState::SubjectCharacterRelations => "SUBJECT_CHARACTER_RELATIONS",
            IngestState::PersonCharacterRelations => "PERSON_CHARACTER_RELATIONS",
            IngestState::Done => "DONE",
            IngestState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub run_id: Uuid,
    pub old_state: IngestState,
    pub new_state: IngestState,
    pub transitioned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_display() {
        let json = serde_json::to_string(&IngestState::SubjectCharacterRelations).unwrap();
        assert_eq!(json, "\"SUBJECT_CHARACTER_RELATIONS\"");
        assert_eq!(
            IngestState::SubjectCharacterRelations.to_string(),
            "SUBJECT_CHARACTER_RELATIONS"
        );
    }

    #[test]
    fn test_every_kind_has_a_stage() {
        let stages: Vec<IngestState> = RecordKind::ALL
            .iter()
            .map(|k| IngestState::for_kind(*k))
            .collect();
        assert_eq!(stages.first(), Some(&IngestState::Subjects));
        assert_eq!(stages.last(), Some(&IngestState::PersonCharacterRelations));
        assert!(stages.iter().all(|s| !s.is_terminal()));
    }
}
