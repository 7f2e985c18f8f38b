//! Node and edge writes for each archive kind
//!
//! Entity writes are plain creates keyed by the source id. Relation writes
//! merge: an edge is only added when no edge with the same type, endpoints
//! and label exists, so replaying a relation file never duplicates.

use super::graph_store::{EdgeType, GraphStore, NodeRef};
use bangumi_common::codes::{Career, CharacterRole, PersonType, SubjectCharacterType};
use bangumi_common::records::{
    CharacterRecord, PersonCharacterRecord, PersonRecord, SubjectCharacterRecord,
    SubjectPersonRecord, SubjectRecord, SubjectRelationRecord,
};
use bangumi_common::taxonomy::PlatformType;
use bangumi_common::{Category, Error, Result};
use serde_json::json;

/// Writes archive records into a [`GraphStore`]
///
/// Labels are resolved by the caller; the writer only shapes properties.
pub struct GraphWriter<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> GraphWriter<'a> {
    pub fn new(store: &'a dyn GraphStore) -> Self {
        Self { store }
    }

    /// Platform node named `"<category label>/<platform label>"`
    pub async fn write_platform(&self, category: Category, platform: &PlatformType) -> Result<()> {
        let name = format!("{}/{}", category.label(), platform.type_cn);
        tracing::debug!(
            category = category.code(),
            platform_id = platform.id,
            "Inserting platform {}",
            name
        );

        self.store
            .create_node(
                &NodeRef::platform(category.code(), platform.id),
                &json!({
                    "platform_id": platform.id,
                    "category": category.code(),
                    "name": name,
                }),
            )
            .await?;
        Ok(())
    }

    /// Subject node plus its `BELONGS_TO` edge
    ///
    /// The platform node is merged: a platform id missing from the platform
    /// table still gets a (nameless) node.
    pub async fn write_subject(&self, subject: &SubjectRecord, category: Category) -> Result<()> {
        tracing::debug!(subject_id = subject.id, "Inserting subject {}", subject.name);

        let node = NodeRef::subject(subject.id);
        self.store
            .create_node(
                &node,
                &json!({
                    "subject_id": subject.id,
                    "name": subject.name,
                    "name_cn": subject.name_cn,
                    "infobox": subject.infobox,
                    "summary": subject.summary,
                    "date": subject.date,
                    "series": subject.series,
                    "tags": subject.tag_names(),
                    "category": category.label(),
                }),
            )
            .await?;

        let platform = NodeRef::platform(category.code(), subject.platform);
        self.store
            .merge_node(
                &platform,
                &json!({
                    "platform_id": subject.platform,
                    "category": category.code(),
                }),
            )
            .await?;
        self.store
            .merge_edge(EdgeType::BelongsTo, &node, &platform, "", &json!({}))
            .await?;

        Ok(())
    }

    pub async fn write_person(
        &self,
        person: &PersonRecord,
        person_type: PersonType,
        careers: &[Career],
    ) -> Result<()> {
        tracing::debug!(person_id = person.id, "Inserting person {}", person.name);

        let career_labels: Vec<&str> = careers.iter().map(|c| c.label()).collect();
        self.store
            .create_node(
                &NodeRef::person(person.id),
                &json!({
                    "person_id": person.id,
                    "name": person.name,
                    "type": person_type.label(),
                    "infobox": person.infobox,
                    "summary": person.summary,
                    "career": career_labels,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn write_character(
        &self,
        character: &CharacterRecord,
        role: CharacterRole,
    ) -> Result<()> {
        tracing::debug!(character_id = character.id, "Inserting character {}", character.name);

        self.store
            .create_node(
                &NodeRef::character(character.id),
                &json!({
                    "character_id": character.id,
                    "role": role.label(),
                    "name": character.name,
                    "infobox": character.infobox,
                    "summary": character.summary,
                }),
            )
            .await?;
        Ok(())
    }

    /// `RELATED_TO` from the subject to the related subject
    ///
    /// Returns `true` when a new edge was created.
    pub async fn write_subject_relation(
        &self,
        relation: &SubjectRelationRecord,
        label: &str,
    ) -> Result<bool> {
        self.store
            .merge_edge(
                EdgeType::RelatedTo,
                &NodeRef::subject(relation.subject_id),
                &NodeRef::subject(relation.related_subject_id),
                label,
                &json!({
                    "relation_type": relation.relation_type,
                    "order": relation.order,
                }),
            )
            .await
    }

    /// `STAFF` from the subject to the person
    pub async fn write_subject_person(
        &self,
        staff: &SubjectPersonRecord,
        label: &str,
    ) -> Result<bool> {
        self.store
            .merge_edge(
                EdgeType::Staff,
                &NodeRef::subject(staff.subject_id),
                &NodeRef::person(staff.person_id),
                label,
                &json!({ "position": staff.position }),
            )
            .await
    }

    /// `APPEARS_IN` from the character to the subject
    pub async fn write_character_appearance(
        &self,
        appearance: &SubjectCharacterRecord,
        appearance_type: SubjectCharacterType,
    ) -> Result<bool> {
        self.store
            .merge_edge(
                EdgeType::AppearsIn,
                &NodeRef::character(appearance.character_id),
                &NodeRef::subject(appearance.subject_id),
                appearance_type.label(),
                &json!({ "order": appearance.order }),
            )
            .await
    }

    /// Role node for one (person, character, subject) triple
    ///
    /// `Person -PLAYS-> Role -AS-> Character` and `Role -IN-> Subject`. The
    /// Role node is identified by the (character, subject) pair and carries
    /// `role_label` as its name, so the same pair always lands on the same
    /// node and two pairs with equal display names stay apart.
    pub async fn write_role_performance(
        &self,
        performance: &PersonCharacterRecord,
        role_label: &str,
    ) -> Result<bool> {
        let person = NodeRef::person(performance.person_id);
        let character = NodeRef::character(performance.character_id);
        let subject = NodeRef::subject(performance.subject_id);

        // Endpoints first, so a dangling id leaves no orphan Role node behind
        for endpoint in [&person, &character, &subject] {
            if self.store.find_node(endpoint).await?.is_none() {
                return Err(Error::NotFound(endpoint.to_string()));
            }
        }

        let role = NodeRef::role(performance.character_id, performance.subject_id);
        self.store
            .merge_node(
                &role,
                &json!({
                    "name": role_label,
                    "character_id": performance.character_id,
                    "subject_id": performance.subject_id,
                }),
            )
            .await?;

        let plays = self
            .store
            .merge_edge(
                EdgeType::Plays,
                &person,
                &role,
                "",
                &json!({ "summary": performance.summary }),
            )
            .await?;
        let as_character = self
            .store
            .merge_edge(EdgeType::As, &role, &character, "", &json!({}))
            .await?;
        let in_subject = self
            .store
            .merge_edge(EdgeType::In, &role, &subject, "", &json!({}))
            .await?;

        Ok(plays || as_character || in_subject)
    }
}
