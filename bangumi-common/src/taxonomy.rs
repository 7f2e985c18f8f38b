//! Static taxonomy tables from the upstream `bangumi/common` repository
//!
//! Three YAML files, each keyed first by subject category and then by a
//! numeric code:
//!
//! - `subject_relations.yml` — subject → subject relation types
//! - `subject_staffs.yml` — subject → person staff positions
//! - `subject_platforms.yml` — platform types per category
//!
//! Only integer keys are taken at both levels. The upstream files carry a few
//! string-keyed helper entries (anchors, defaults) which are skipped.

use crate::codes::Category;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const RELATIONS_FILE: &str = "subject_relations.yml";
pub const STAFFS_FILE: &str = "subject_staffs.yml";
pub const PLATFORMS_FILE: &str = "subject_platforms.yml";

/// One subject → subject relation type
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectRelationType {
    #[serde(default)]
    pub en: String,
    pub cn: String,
    #[serde(default)]
    pub jp: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub skip_vice_versa: bool,
}

/// One subject → person staff position
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaffPosition {
    #[serde(default)]
    pub en: String,
    pub cn: String,
    #[serde(default)]
    pub jp: String,
    /// Optional classification tag
    #[serde(default)]
    pub rdf: Option<String>,
    #[serde(default)]
    pub desc: String,
}

/// One platform type of a category
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformType {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub type_name: String,
    pub type_cn: String,
}

/// Two-level table: category → code → entry
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable<T> {
    entries: BTreeMap<Category, BTreeMap<u32, T>>,
}

impl<T> Default for CategoryTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> CategoryTable<T> {
    /// Sub-table of one category, `None` if the category has no entries at all
    pub fn sub_table(&self, category: Category) -> Option<&BTreeMap<u32, T>> {
        self.entries.get(&category)
    }

    pub fn get(&self, category: Category, code: u32) -> Option<&T> {
        self.entries.get(&category).and_then(|t| t.get(&code))
    }

    /// Iterate categories in code order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &BTreeMap<u32, T>)> {
        self.entries.iter().map(|(c, t)| (*c, t))
    }

    /// Total number of entries across all categories
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, category: Category, code: u32, entry: T) {
        self.entries.entry(category).or_default().insert(code, entry);
    }
}

impl<T: DeserializeOwned> CategoryTable<T> {
    /// Parse a YAML document whose `root_key` holds the two-level table
    pub fn from_yaml(source: &str, root_key: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(source)
            .map_err(|e| Error::Config(format!("Invalid YAML: {}", e)))?;

        let root = document
            .get(root_key)
            .and_then(Value::as_mapping)
            .ok_or_else(|| Error::Config(format!("Missing '{}' mapping", root_key)))?;

        let mut table = CategoryTable::default();
        for (category_key, codes) in root {
            let Some(raw_category) = integer_key(category_key) else {
                continue;
            };
            let code = u8::try_from(raw_category).map_err(|_| {
                Error::Config(format!("Category key out of range: {}", raw_category))
            })?;
            let category = Category::try_from(code)?;

            let Some(codes) = codes.as_mapping() else {
                return Err(Error::Config(format!(
                    "'{}.{}' is not a mapping",
                    root_key, raw_category
                )));
            };

            for (code_key, entry) in codes {
                let Some(raw_code) = integer_key(code_key) else {
                    continue;
                };
                let code = u32::try_from(raw_code)
                    .map_err(|_| Error::Config(format!("Code key out of range: {}", raw_code)))?;
                let entry: T = serde_yaml::from_value(entry.clone()).map_err(|e| {
                    Error::Config(format!("'{}.{}.{}': {}", root_key, raw_category, code, e))
                })?;
                table.insert(category, code, entry);
            }
        }

        Ok(table)
    }

    fn load(path: &Path, root_key: &str) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let table = Self::from_yaml(&source, root_key)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!(file = %path.display(), entries = table.len(), "Taxonomy table loaded");
        Ok(table)
    }
}

fn integer_key(key: &Value) -> Option<i64> {
    match key {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// All static tables needed by one ingestion run
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    pub relations: CategoryTable<SubjectRelationType>,
    pub staffs: CategoryTable<StaffPosition>,
    pub platforms: CategoryTable<PlatformType>,
}

impl Taxonomy {
    /// Load the three tables from a `bangumi/common` checkout
    pub fn load(common_folder: &Path) -> Result<Self> {
        let taxonomy = Self {
            relations: CategoryTable::load(&common_folder.join(RELATIONS_FILE), "relations")?,
            staffs: CategoryTable::load(&common_folder.join(STAFFS_FILE), "staffs")?,
            platforms: CategoryTable::load(&common_folder.join(PLATFORMS_FILE), "platforms")?,
        };

        tracing::info!(
            relations = taxonomy.relations.len(),
            staffs = taxonomy.staffs.len(),
            platforms = taxonomy.platforms.len(),
            "Taxonomy loaded from {}",
            common_folder.display()
        );

        Ok(taxonomy)
    }

    /// Build from in-memory YAML documents
    pub fn from_yaml(relations: &str, staffs: &str, platforms: &str) -> Result<Self> {
        Ok(Self {
            relations: CategoryTable::from_yaml(relations, "relations")?,
            staffs: CategoryTable::from_yaml(staffs, "staffs")?,
            platforms: CategoryTable::from_yaml(platforms, "platforms")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELATIONS: &str = r#"
relations:
  2:
    1:
      en: Adaptation
      cn: 改编
      jp: 翻案
      desc: 同系列不同平台作品
    3:
      en: Sequel
      cn: 续集
      jp: 続編
      desc: ''
      skip_vice_versa: true
  4:
    1:
      en: Adaptation
      cn: 改编
      jp: 翻案
      desc: ''
  defaults: {}
"#;

    const STAFFS: &str = r#"
staffs:
  2:
    1:
      cn: 原作
      jp: 原作
      en: Original Creator
      rdf: author
"#;

    const PLATFORMS: &str = r#"
platforms:
  2:
    0:
      id: 0
      type: other
      type_cn: 其他
    1:
      id: 1
      type: TV
      type_cn: TV
      wiki_tpl: TVAnime
"#;

    #[test]
    fn test_parses_two_level_tables() {
        let taxonomy = Taxonomy::from_yaml(RELATIONS, STAFFS, PLATFORMS).unwrap();

        assert_eq!(taxonomy.relations.len(), 3);
        let sequel = taxonomy.relations.get(Category::Anime, 3).unwrap();
        assert_eq!(sequel.cn, "续集");
        assert!(sequel.skip_vice_versa);

        let staff = taxonomy.staffs.get(Category::Anime, 1).unwrap();
        assert_eq!(staff.rdf.as_deref(), Some("author"));

        let tv = taxonomy.platforms.get(Category::Anime, 1).unwrap();
        assert_eq!(tv.type_cn, "TV");
        assert_eq!(tv.type_name, "TV");
    }

    #[test]
    fn test_string_keys_are_skipped() {
        let table: CategoryTable<SubjectRelationType> =
            CategoryTable::from_yaml(RELATIONS, "relations").unwrap();
        let categories: Vec<Category> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, vec![Category::Anime, Category::Game]);
        assert!(table.sub_table(Category::Music).is_none());
    }

    #[test]
    fn test_unknown_category_key_is_error() {
        let yaml = "relations:\n  5:\n    1:\n      cn: x\n";
        let err = CategoryTable::<SubjectRelationType>::from_yaml(yaml, "relations").unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
    }

    #[test]
    fn test_missing_root_key_is_config_error() {
        let err = CategoryTable::<StaffPosition>::from_yaml("other: {}", "staffs").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RELATIONS_FILE), RELATIONS).unwrap();
        std::fs::write(dir.path().join(STAFFS_FILE), STAFFS).unwrap();
        std::fs::write(dir.path().join(PLATFORMS_FILE), PLATFORMS).unwrap();

        let taxonomy = Taxonomy::load(dir.path()).unwrap();
        assert_eq!(taxonomy.platforms.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Taxonomy::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(RELATIONS_FILE));
    }
}
