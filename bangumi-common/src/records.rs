//! Typed records decoded from the archive's `.jsonlines` files
//!
//! Each line of a dump file is one JSON object. Only the fields declared here
//! are projected; everything else the upstream dump carries (scores, rank,
//! favorites, ...) is ignored so newer dumps keep decoding.
//!
//! Ids and type codes are required. A line missing one of them fails the same
//! way a syntactically broken line does: with [`Error::Decode`].

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// The seven dump files, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Subject,
    Person,
    Character,
    SubjectRelation,
    SubjectPerson,
    SubjectCharacter,
    PersonCharacter,
}

impl RecordKind {
    pub const ALL: [RecordKind; 7] = [
        RecordKind::Subject,
        RecordKind::Person,
        RecordKind::Character,
        RecordKind::SubjectRelation,
        RecordKind::SubjectPerson,
        RecordKind::SubjectCharacter,
        RecordKind::PersonCharacter,
    ];

    /// File name inside the data folder
    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::Subject => "subject.jsonlines",
            RecordKind::Person => "person.jsonlines",
            RecordKind::Character => "character.jsonlines",
            RecordKind::SubjectRelation => "subject-relations.jsonlines",
            RecordKind::SubjectPerson => "subject-persons.jsonlines",
            RecordKind::SubjectCharacter => "subject-characters.jsonlines",
            RecordKind::PersonCharacter => "person-characters.jsonlines",
        }
    }

    /// True for the four relation kinds
    pub fn is_relation(self) -> bool {
        !matches!(
            self,
            RecordKind::Subject | RecordKind::Person | RecordKind::Character
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Subject => "subjects",
            RecordKind::Person => "persons",
            RecordKind::Character => "characters",
            RecordKind::SubjectRelation => "subject relations",
            RecordKind::SubjectPerson => "subject-person relations",
            RecordKind::SubjectCharacter => "subject-character relations",
            RecordKind::PersonCharacter => "person-character relations",
        };
        f.write_str(name)
    }
}

/// A record type that can be read from its dump file
pub trait JsonRecord: DeserializeOwned + Send {
    const KIND: RecordKind;
}

/// Decode one line of a dump file
///
/// `line` is 1-based and only used for the error message.
pub fn decode_line<T: JsonRecord>(path: &Path, line: usize, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        line,
        source,
    })
}

/// Tag attached to a subject (only `name` is written to the graph)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// `subject.jsonlines`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectRecord {
    pub id: u32,
    /// Category code, see [`crate::codes::Category`]
    #[serde(rename = "type")]
    pub category: u8,
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(default)]
    pub infobox: String,
    #[serde(default)]
    pub platform: u32,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub series: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl SubjectRecord {
    /// Localized name when present, otherwise the native name
    pub fn display_name(&self) -> &str {
        if self.name_cn.trim().is_empty() {
            &self.name
        } else {
            &self.name_cn
        }
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }
}

impl JsonRecord for SubjectRecord {
    const KIND: RecordKind = RecordKind::Subject;
}

/// `person.jsonlines`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonRecord {
    pub id: u32,
    pub name: String,
    /// Person type code, see [`crate::codes::PersonType`]
    #[serde(rename = "type")]
    pub person_type: u8,
    #[serde(default)]
    pub infobox: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub career: Vec<String>,
}

impl JsonRecord for PersonRecord {
    const KIND: RecordKind = RecordKind::Person;
}

/// `character.jsonlines`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CharacterRecord {
    pub id: u32,
    /// Role code, see [`crate::codes::CharacterRole`]
    pub role: u8,
    pub name: String,
    #[serde(default)]
    pub infobox: String,
    #[serde(default)]
    pub summary: String,
}

impl JsonRecord for CharacterRecord {
    const KIND: RecordKind = RecordKind::Character;
}

/// `subject-relations.jsonlines` (directed: subject → related subject)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectRelationRecord {
    pub subject_id: u32,
    pub relation_type: u32,
    pub related_subject_id: u32,
    #[serde(default)]
    pub order: Option<u32>,
}

impl JsonRecord for SubjectRelationRecord {
    const KIND: RecordKind = RecordKind::SubjectRelation;
}

/// `subject-persons.jsonlines`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectPersonRecord {
    pub person_id: u32,
    pub subject_id: u32,
    pub position: u32,
}

impl JsonRecord for SubjectPersonRecord {
    const KIND: RecordKind = RecordKind::SubjectPerson;
}

/// `subject-characters.jsonlines`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectCharacterRecord {
    pub character_id: u32,
    pub subject_id: u32,
    /// Appearance type, see [`crate::codes::SubjectCharacterType`]
    #[serde(rename = "type")]
    pub appearance: u8,
    #[serde(default)]
    pub order: Option<u32>,
}

impl JsonRecord for SubjectCharacterRecord {
    const KIND: RecordKind = RecordKind::SubjectCharacter;
}

/// `person-characters.jsonlines` (person voiced/played character in subject)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonCharacterRecord {
    pub person_id: u32,
    pub subject_id: u32,
    pub character_id: u32,
    #[serde(default)]
    pub summary: String,
}

impl JsonRecord for PersonCharacterRecord {
    const KIND: RecordKind = RecordKind::PersonCharacter;
}
