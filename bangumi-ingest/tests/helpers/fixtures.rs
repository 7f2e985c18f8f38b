//! Archive fixtures for pipeline tests
//!
//! A temporary data folder with all seven dump files (empty unless written),
//! a small taxonomy and store constructors.

use async_trait::async_trait;
use bangumi_common::config::RecordLimits;
use bangumi_common::records::RecordKind;
use bangumi_common::taxonomy::Taxonomy;
use bangumi_common::{Error, Result};
use bangumi_ingest::db::{
    init_memory_pool, EdgeType, GraphStore, NodeLabel, NodeRef, SqliteGraphStore,
};
use bangumi_ingest::{IngestOrchestrator, IngestSettings};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const RELATIONS_YAML: &str = r#"
relations:
  2:
    1:
      en: Adaptation
      cn: 改编
      jp: 翻案
      desc: ''
    3:
      en: Sequel
      cn: 续集
      jp: 続編
      desc: ''
"#;

pub const STAFFS_YAML: &str = r#"
staffs:
  2:
    1:
      en: Original Creator
      cn: 原作
      jp: 原作
    2:
      en: Director
      cn: 导演
      jp: 監督
"#;

pub const PLATFORMS_YAML: &str = r#"
platforms:
  2:
    1:
      id: 1
      type: TV
      type_cn: TV
    2:
      id: 2
      type: OVA
      type_cn: OVA
  1:
    1001:
      id: 1001
      type: Novel
      type_cn: 小说
"#;

pub fn taxonomy() -> Taxonomy {
    Taxonomy::from_yaml(RELATIONS_YAML, STAFFS_YAML, PLATFORMS_YAML).unwrap()
}

/// Temporary `raw_data` folder
pub struct ArchiveFixture {
    _dir: TempDir,
    pub data_folder: PathBuf,
}

impl ArchiveFixture {
    /// All seven files present and empty
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data_folder = dir.path().join("raw_data");
        std::fs::create_dir_all(&data_folder).unwrap();
        for kind in RecordKind::ALL {
            std::fs::write(data_folder.join(kind.file_name()), "").unwrap();
        }
        Self {
            _dir: dir,
            data_folder,
        }
    }

    pub fn write(&self, kind: RecordKind, records: &[Value]) -> &Self {
        let text: String = records.iter().map(|r| format!("{}\n", r)).collect();
        self.write_raw(kind, &text)
    }

    pub fn write_raw(&self, kind: RecordKind, text: &str) -> &Self {
        std::fs::write(self.data_folder.join(kind.file_name()), text).unwrap();
        self
    }

    pub fn remove(&self, kind: RecordKind) {
        std::fs::remove_file(self.data_folder.join(kind.file_name())).unwrap();
    }

    pub fn settings(&self) -> IngestSettings {
        self.settings_with_limits(RecordLimits::default())
    }

    pub fn settings_with_limits(&self, limits: RecordLimits) -> IngestSettings {
        IngestSettings {
            data_folder: self.data_folder.clone(),
            limits,
        }
    }
}

pub fn subject(id: u32, category: u8) -> Value {
    json!({
        "id": id,
        "type": category,
        "name": format!("Subject {}", id),
        "name_cn": "",
        "infobox": "",
        "platform": 1,
        "summary": "",
        "nsfw": false,
        "tags": [],
        "score": 7.5,
        "rank": 100,
    })
}

pub fn named_subject(id: u32, category: u8, name: &str, name_cn: &str) -> Value {
    let mut value = subject(id, category);
    value["name"] = json!(name);
    value["name_cn"] = json!(name_cn);
    value
}

pub fn nsfw_subject(id: u32) -> Value {
    let mut value = subject(id, 2);
    value["nsfw"] = json!(true);
    value
}

pub fn person(id: u32, person_type: u8) -> Value {
    json!({
        "id": id,
        "name": format!("Person {}", id),
        "type": person_type,
        "career": ["seiyu"],
        "infobox": "",
        "summary": "",
    })
}

pub fn character(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "role": 1,
        "name": name,
        "infobox": "",
        "summary": "",
    })
}

pub fn subject_relation(subject_id: u32, relation_type: u32, related_subject_id: u32) -> Value {
    json!({
        "subject_id": subject_id,
        "relation_type": relation_type,
        "related_subject_id": related_subject_id,
        "order": 0,
    })
}

pub fn subject_person(subject_id: u32, person_id: u32, position: u32) -> Value {
    json!({ "subject_id": subject_id, "person_id": person_id, "position": position })
}

pub fn subject_character(subject_id: u32, character_id: u32, appearance: u8) -> Value {
    json!({
        "subject_id": subject_id,
        "character_id": character_id,
        "type": appearance,
        "order": 0,
    })
}

pub fn person_character(person_id: u32, subject_id: u32, character_id: u32) -> Value {
    json!({
        "person_id": person_id,
        "subject_id": subject_id,
        "character_id": character_id,
        "summary": "",
    })
}

pub async fn memory_store() -> Arc<SqliteGraphStore> {
    Arc::new(SqliteGraphStore::new(init_memory_pool().await.unwrap()))
}

pub fn orchestrator(store: Arc<dyn GraphStore>, settings: IngestSettings) -> IngestOrchestrator {
    IngestOrchestrator::new(store, taxonomy(), settings)
}

/// Store that fails every edge merge of one type leaving one source node
///
/// Everything else is delegated to the wrapped SQLite store.
pub struct FailingEdgeStore {
    pub inner: Arc<SqliteGraphStore>,
    pub rel_type: EdgeType,
    pub source: NodeRef,
}

#[async_trait]
impl GraphStore for FailingEdgeStore {
    async fn clear_all(&self) -> Result<()> {
        self.inner.clear_all().await
    }

    async fn has_constraint(&self, name: &str) -> Result<bool> {
        self.inner.has_constraint(name).await
    }

    async fn create_unique_constraint(&self, name: &str, label: NodeLabel) -> Result<()> {
        self.inner.create_unique_constraint(name, label).await
    }

    async fn create_node(&self, node: &NodeRef, properties: &Value) -> Result<i64> {
        self.inner.create_node(node, properties).await
    }

    async fn merge_node(&self, node: &NodeRef, properties: &Value) -> Result<i64> {
        self.inner.merge_node(node, properties).await
    }

    async fn find_node(&self, node: &NodeRef) -> Result<Option<i64>> {
        self.inner.find_node(node).await
    }

    async fn merge_edge(
        &self,
        rel_type: EdgeType,
        from: &NodeRef,
        to: &NodeRef,
        label: &str,
        properties: &Value,
    ) -> Result<bool> {
        if rel_type == self.rel_type && *from == self.source {
            return Err(Error::Internal(format!("injected failure for {}", from)));
        }
        self.inner.merge_edge(rel_type, from, to, label, properties).await
    }

    async fn count_nodes(&self, label: NodeLabel) -> Result<u64> {
        self.inner.count_nodes(label).await
    }

    async fn count_edges(&self, rel_type: EdgeType) -> Result<u64> {
        self.inner.count_edges(rel_type).await
    }
}
