//! Graph store boundary
//!
//! The ingestion core only talks to the store through [`GraphStore`]:
//! a destructive clear, uniqueness constraints by name, node create/merge and
//! edge merge. Everything kind-specific lives in
//! [`GraphWriter`](super::GraphWriter).

use async_trait::async_trait;
use bangumi_common::Result;
use serde_json::Value;
use std::fmt;

/// Node labels of the Bangumi graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    Platform,
    Subject,
    Person,
    Character,
    /// Role-performance node: a person playing a character in a subject
    Role,
}

impl NodeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeLabel::Platform => "Platform",
            NodeLabel::Subject => "Subject",
            NodeLabel::Person => "Person",
            NodeLabel::Character => "Character",
            NodeLabel::Role => "Role",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types of the Bangumi graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    /// Subject → Platform
    BelongsTo,
    /// Subject → Subject, labeled with the relation type
    RelatedTo,
    /// Subject → Person, labeled with the staff position
    Staff,
    /// Character → Subject, labeled with the appearance type
    AppearsIn,
    /// Person → Role
    Plays,
    /// Role → Character
    As,
    /// Role → Subject
    In,
}

impl EdgeType {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::BelongsTo => "BELONGS_TO",
            EdgeType::RelatedTo => "RELATED_TO",
            EdgeType::Staff => "STAFF",
            EdgeType::AppearsIn => "APPEARS_IN",
            EdgeType::Plays => "PLAYS",
            EdgeType::As => "AS",
            EdgeType::In => "IN",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a node by label and natural key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: String,
}

impl NodeRef {
    pub fn new(label: NodeLabel, key: impl Into<String>) -> Self {
        Self {
            label,
            key: key.into(),
        }
    }

    pub fn subject(id: u32) -> Self {
        Self::new(NodeLabel::Subject, id.to_string())
    }

    pub fn person(id: u32) -> Self {
        Self::new(NodeLabel::Person, id.to_string())
    }

    pub fn character(id: u32) -> Self {
        Self::new(NodeLabel::Character, id.to_string())
    }

    /// Platforms are keyed by the (category, platform id) pair
    pub fn platform(category: u8, platform_id: u32) -> Self {
        Self::new(NodeLabel::Platform, format!("{}/{}", category, platform_id))
    }

    /// Roles are keyed by the (character, subject) id pair; display names
    /// are not unique across subjects
    pub fn role(character_id: u32, subject_id: u32) -> Self {
        Self::new(NodeLabel::Role, format!("{}/{}", character_id, subject_id))
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.label, self.key)
    }
}

/// Name of the uniqueness constraint guarding one label's natural key
pub fn constraint_name(label: NodeLabel) -> String {
    format!("uq_{}_key", label.as_str().to_lowercase())
}

/// Opaque property-graph store
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Delete every node and edge. Constraints survive.
    async fn clear_all(&self) -> Result<()>;

    /// Whether a constraint with this name exists
    async fn has_constraint(&self, name: &str) -> Result<bool>;

    /// Create a uniqueness constraint on the natural key of `label`
    async fn create_unique_constraint(&self, name: &str, label: NodeLabel) -> Result<()>;

    /// Insert a node; a duplicate key under a constraint is an error
    async fn create_node(&self, node: &NodeRef, properties: &Value) -> Result<i64>;

    /// Match or create a node, returning its id
    async fn merge_node(&self, node: &NodeRef, properties: &Value) -> Result<i64>;

    /// Match a node
    async fn find_node(&self, node: &NodeRef) -> Result<Option<i64>>;

    /// Create an edge unless one with the same type, endpoints and label exists
    ///
    /// Both endpoints must exist. Returns `true` when a new edge was created.
    async fn merge_edge(
        &self,
        rel_type: EdgeType,
        from: &NodeRef,
        to: &NodeRef,
        label: &str,
        properties: &Value,
    ) -> Result<bool>;

    async fn count_nodes(&self, label: NodeLabel) -> Result<u64>;

    async fn count_edges(&self, rel_type: EdgeType) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ref_keys() {
        assert_eq!(NodeRef::subject(12).key, "12");
        assert_eq!(NodeRef::platform(2, 1).key, "2/1");
        assert_eq!(NodeRef::role(5, 1).to_string(), "Role[5/1]");
    }

    #[test]
    fn test_constraint_names() {
        assert_eq!(constraint_name(NodeLabel::Subject), "uq_subject_key");
        assert_eq!(constraint_name(NodeLabel::Character), "uq_character_key");
    }
}
