//! Category-scoped label resolution
//!
//! Relation and staff codes only mean something inside one subject category,
//! so both lookups pick a category sub-table first and the code second.
//!
//! | Lookup | Category taken from | Code missing |
//! |--------|---------------------|--------------|
//! | subject relation | related subject | category label |
//! | staff position | subject | [`LookupError::StaffPosition`] |

use bangumi_common::taxonomy::Taxonomy;
use bangumi_common::{Category, LookupError};

pub struct LabelResolver<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> LabelResolver<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Label of a subject → subject relation
    ///
    /// `related_category` is the category of the *related* subject. A code
    /// absent from that category's table degrades to the category label.
    pub fn subject_relation_label(
        &self,
        related_category: Category,
        relation_type: u32,
    ) -> Result<String, LookupError> {
        let table = self
            .taxonomy
            .relations
            .sub_table(related_category)
            .ok_or(LookupError::RelationCategory(related_category.code()))?;

        Ok(match table.get(&relation_type) {
            Some(entry) => entry.cn.clone(),
            None => {
                tracing::trace!(
                    category = related_category.code(),
                    relation_type,
                    "Relation type not configured, using category label"
                );
                related_category.label().to_string()
            }
        })
    }

    /// Label of a subject → person staff position
    pub fn staff_position_label(
        &self,
        subject_category: Category,
        position: u32,
    ) -> Result<String, LookupError> {
        let table = self
            .taxonomy
            .staffs
            .sub_table(subject_category)
            .ok_or(LookupError::StaffCategory(subject_category.code()))?;

        table
            .get(&position)
            .map(|entry| entry.cn.clone())
            .ok_or(LookupError::StaffPosition {
                category: subject_category.code(),
                position,
            })
    }
}

/// Name of a Role node: "<character> in <subject>"
pub fn role_performance_label(character_name: &str, subject_name: &str) -> String {
    format!("{} in {}", character_name, subject_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_yaml(
            r#"
relations:
  2:
    3:
      cn: 续集
      en: Sequel
"#,
            r#"
staffs:
  2:
    1:
      cn: 原作
"#,
            "platforms: {}",
        )
        .unwrap()
    }

    #[test]
    fn test_relation_label_from_related_category() {
        let taxonomy = taxonomy();
        let resolver = LabelResolver::new(&taxonomy);

        assert_eq!(resolver.subject_relation_label(Category::Anime, 3).unwrap(), "续集");
    }

    #[test]
    fn test_relation_label_falls_back_to_category() {
        let taxonomy = taxonomy();
        let resolver = LabelResolver::new(&taxonomy);

        assert_eq!(resolver.subject_relation_label(Category::Anime, 999).unwrap(), "动画");
    }

    #[test]
    fn test_relation_category_without_table_is_error() {
        let taxonomy = taxonomy();
        let resolver = LabelResolver::new(&taxonomy);

        assert_eq!(
            resolver.subject_relation_label(Category::Game, 3).unwrap_err(),
            LookupError::RelationCategory(4)
        );
    }

    #[test]
    fn test_staff_position_has_no_fallback() {
        let taxonomy = taxonomy();
        let resolver = LabelResolver::new(&taxonomy);

        assert_eq!(resolver.staff_position_label(Category::Anime, 1).unwrap(), "原作");
        assert_eq!(
            resolver.staff_position_label(Category::Anime, 2).unwrap_err(),
            LookupError::StaffPosition {
                category: 2,
                position: 2
            }
        );
        assert_eq!(
            resolver.staff_position_label(Category::Book, 1).unwrap_err(),
            LookupError::StaffCategory(1)
        );
    }

    #[test]
    fn test_role_label() {
        assert_eq!(role_performance_label("C.C.", "Code Geass"), "C.C. in Code Geass");
    }
}
