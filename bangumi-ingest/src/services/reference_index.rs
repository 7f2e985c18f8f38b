//! In-memory cross-reference index
//!
//! Entity stages record every id they successfully wrote into a
//! [`ReferenceIndexBuilder`]. Before the relation stages start the builder is
//! frozen into a [`ReferenceIndex`], which is read-only for the rest of the
//! run. A relation naming an id that is not in the index is filtered out
//! before it reaches the store.

use bangumi_common::Category;
use std::collections::{HashMap, HashSet};

/// Mutable index, owned by the entity stages
#[derive(Debug, Default)]
pub struct ReferenceIndexBuilder {
    subject_category: HashMap<u32, Category>,
    subject_name: HashMap<u32, String>,
    person_ids: HashSet<u32>,
    character_name: HashMap<u32, String>,
}

impl ReferenceIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_subject(&mut self, subject_id: u32, category: Category, display_name: &str) {
        self.subject_category.insert(subject_id, category);
        self.subject_name.insert(subject_id, display_name.to_string());
    }

    pub fn record_person(&mut self, person_id: u32) {
        self.person_ids.insert(person_id);
    }

    pub fn record_character(&mut self, character_id: u32, name: &str) {
        self.character_name.insert(character_id, name.to_string());
    }

    /// End of the entity stages
    pub fn freeze(self) -> ReferenceIndex {
        tracing::debug!(
            subjects = self.subject_category.len(),
            persons = self.person_ids.len(),
            characters = self.character_name.len(),
            "Reference index frozen"
        );

        ReferenceIndex {
            subject_category: self.subject_category,
            subject_name: self.subject_name,
            person_ids: self.person_ids,
            character_name: self.character_name,
        }
    }
}

/// Read-only index consulted by the relation stages
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    subject_category: HashMap<u32, Category>,
    subject_name: HashMap<u32, String>,
    person_ids: HashSet<u32>,
    character_name: HashMap<u32, String>,
}

impl ReferenceIndex {
    pub fn subject_category(&self, subject_id: u32) -> Option<Category> {
        self.subject_category.get(&subject_id).copied()
    }

    pub fn subject_name(&self, subject_id: u32) -> Option<&str> {
        self.subject_name.get(&subject_id).map(String::as_str)
    }

    pub fn has_subject(&self, subject_id: u32) -> bool {
        self.subject_category.contains_key(&subject_id)
    }

    pub fn has_person(&self, person_id: u32) -> bool {
        self.person_ids.contains(&person_id)
    }

    pub fn character_name(&self, character_id: u32) -> Option<&str> {
        self.character_name.get(&character_id).map(String::as_str)
    }

    pub fn has_character(&self, character_id: u32) -> bool {
        self.character_name.contains_key(&character_id)
    }

    pub fn subject_count(&self) -> usize {
        self.subject_category.len()
    }

    pub fn person_count(&self) -> usize {
        self.person_ids.len()
    }

    pub fn character_count(&self) -> usize {
        self.character_name.len()
    }
}
