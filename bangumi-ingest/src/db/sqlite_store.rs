//! SQLite implementation of [`GraphStore`]
//!
//! A uniqueness constraint is a partial unique index over `nodes(node_key)`
//! restricted to one label. Constraints are discovered by index name in
//! `sqlite_master`, so they survive [`GraphStore::clear_all`] exactly like
//! schema constraints of a graph database survive deleting all nodes.

use super::graph_store::{EdgeType, GraphStore, NodeLabel, NodeRef};
use async_trait::async_trait;
use bangumi_common::{Error, Result};
use serde_json::Value;
use sqlx::SqlitePool;

/// Property graph over the `nodes` / `edges` tables
#[derive(Debug, Clone)]
pub struct SqliteGraphStore {
    pool: SqlitePool,
}

/// One edge with both endpoints rendered as `Label[key]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSummary {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl SqliteGraphStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Properties of one node (diagnostics)
    pub async fn node_properties(&self, node: &NodeRef) -> Result<Option<Value>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT properties FROM nodes WHERE label = ? AND node_key = ? LIMIT 1",
        )
        .bind(node.label.as_str())
        .bind(&node.key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(json,)| {
            serde_json::from_str(&json)
                .map_err(|e| Error::Internal(format!("Corrupt properties on {}: {}", node, e)))
        })
        .transpose()
    }

    /// All edges of one type, ordered by creation (diagnostics)
    pub async fn edges(&self, rel_type: EdgeType) -> Result<Vec<EdgeSummary>> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT s.label, s.node_key, t.label, t.node_key, e.label
            FROM edges e
            JOIN nodes s ON s.node_id = e.source_id
            JOIN nodes t ON t.node_id = e.target_id
            WHERE e.rel_type = ?
            ORDER BY e.edge_id
            "#,
        )
        .bind(rel_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(from_label, from_key, to_label, to_key, label)| EdgeSummary {
                from: format!("{}[{}]", from_label, from_key),
                to: format!("{}[{}]", to_label, to_key),
                label,
            })
            .collect())
    }
}

fn validate_constraint_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid constraint name '{}'", name)))
    }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn clear_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM edges").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM nodes").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn has_constraint(&self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn create_unique_constraint(&self, name: &str, label: NodeLabel) -> Result<()> {
        validate_constraint_name(name)?;

        // Identifiers cannot be bound; both parts are validated/static
        let sql = format!(
            "CREATE UNIQUE INDEX {} ON nodes(node_key) WHERE label = '{}'",
            name,
            label.as_str()
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn create_node(&self, node: &NodeRef, properties: &Value) -> Result<i64> {
        let result = sqlx::query("INSERT INTO nodes (label, node_key, properties) VALUES (?, ?, ?)")
            .bind(node.label.as_str())
            .bind(&node.key)
            .bind(properties.to_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                Error::ConstraintViolation(format!("{} already exists", node)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn merge_node(&self, node: &NodeRef, properties: &Value) -> Result<i64> {
        if let Some(node_id) = self.find_node(node).await? {
            return Ok(node_id);
        }
        self.create_node(node, properties).await
    }

    async fn find_node(&self, node: &NodeRef) -> Result<Option<i64>> {
        let node_id: Option<i64> = sqlx::query_scalar(
            "SELECT node_id FROM nodes WHERE label = ? AND node_key = ? ORDER BY node_id LIMIT 1",
        )
        .bind(node.label.as_str())
        .bind(&node.key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(node_id)
    }

    async fn merge_edge(
        &self,
        rel_type: EdgeType,
        from: &NodeRef,
        to: &NodeRef,
        label: &str,
        properties: &Value,
    ) -> Result<bool> {
        let source_id = self
            .find_node(from)
            .await?
            .ok_or_else(|| Error::NotFound(from.to_string()))?;
        let target_id = self
            .find_node(to)
            .await?
            .ok_or_else(|| Error::NotFound(to.to_string()))?;

        let done = sqlx::query(
            r#"
            INSERT INTO edges (rel_type, source_id, target_id, label, properties)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(rel_type, source_id, target_id, label) DO NOTHING
            "#,
        )
        .bind(rel_type.as_str())
        .bind(source_id)
        .bind(target_id)
        .bind(label)
        .bind(properties.to_string())
        .execute(&self.pool)
        .await?;

        Ok(done.rows_affected() == 1)
    }

    async fn count_nodes(&self, label: NodeLabel) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nodes WHERE label = ?")
            .bind(label.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_edges(&self, rel_type: EdgeType) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM edges WHERE rel_type = ?")
            .bind(rel_type.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::graph_store::constraint_name;
    use crate::db::init_memory_pool;
    use serde_json::json;

    async fn store() -> SqliteGraphStore {
        SqliteGraphStore::new(init_memory_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_constraint_created_once_and_enforced() {
        let store = store().await;
        let name = constraint_name(NodeLabel::Subject);

        assert!(!store.has_constraint(&name).await.unwrap());
        store
            .create_unique_constraint(&name, NodeLabel::Subject)
            .await
            .unwrap();
        assert!(store.has_constraint(&name).await.unwrap());

        store.create_node(&NodeRef::subject(1), &json!({})).await.unwrap();
        let err = store
            .create_node(&NodeRef::subject(1), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        // Other labels are not affected by the Subject constraint
        store.create_node(&NodeRef::person(1), &json!({})).await.unwrap();
        store.create_node(&NodeRef::person(1), &json!({})).await.unwrap();
        assert_eq!(store.count_nodes(NodeLabel::Person).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalid_constraint_name_rejected() {
        let store = store().await;
        let err = store
            .create_unique_constraint("x; DROP TABLE nodes", NodeLabel::Subject)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_merge_node_matches_existing() {
        let store = store().await;
        let platform = NodeRef::platform(2, 1);

        let first = store.merge_node(&platform, &json!({"name": "动画/TV"})).await.unwrap();
        let second = store.merge_node(&platform, &json!({"name": "other"})).await.unwrap();

        assert_eq!(first, second);
        let props = store.node_properties(&platform).await.unwrap().unwrap();
        assert_eq!(props["name"], "动画/TV");
    }

    #[tokio::test]
    async fn test_merge_edge_is_idempotent_per_label() {
        let store = store().await;
        store.create_node(&NodeRef::subject(1), &json!({})).await.unwrap();
        store.create_node(&NodeRef::subject(2), &json!({})).await.unwrap();

        let a = NodeRef::subject(1);
        let b = NodeRef::subject(2);
        let no_props = json!({});
        assert!(store
            .merge_edge(EdgeType::RelatedTo, &a, &b, "续集", &no_props)
            .await
            .unwrap());
        assert!(!store
            .merge_edge(EdgeType::RelatedTo, &a, &b, "续集", &no_props)
            .await
            .unwrap());
        assert!(store
            .merge_edge(EdgeType::RelatedTo, &a, &b, "改编", &no_props)
            .await
            .unwrap());

        assert_eq!(store.count_edges(EdgeType::RelatedTo).await.unwrap(), 2);
        let edges = store.edges(EdgeType::RelatedTo).await.unwrap();
        assert_eq!(edges[0].from, "Subject[1]");
        assert_eq!(edges[0].to, "Subject[2]");
        assert_eq!(edges[0].label, "续集");
    }

    #[tokio::test]
    async fn test_merge_edge_missing_endpoint_is_not_found() {
        let store = store().await;
        store.create_node(&NodeRef::subject(1), &json!({})).await.unwrap();

        let err = store
            .merge_edge(
                EdgeType::RelatedTo,
                &NodeRef::subject(1),
                &NodeRef::subject(99),
                "续集",
                &json!({}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(ref what) if what == "Subject[99]"));
        assert_eq!(store.count_edges(EdgeType::RelatedTo).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_constraints() {
        let store = store().await;
        let name = constraint_name(NodeLabel::Person);
        store.create_unique_constraint(&name, NodeLabel::Person).await.unwrap();
        store.create_node(&NodeRef::person(5), &json!({})).await.unwrap();
        store.create_node(&NodeRef::subject(5), &json!({})).await.unwrap();
        store
            .merge_edge(
                EdgeType::Staff,
                &NodeRef::subject(5),
                &NodeRef::person(5),
                "原作",
                &json!({}),
            )
            .await
            .unwrap();

        store.clear_all().await.unwrap();

        assert_eq!(store.count_nodes(NodeLabel::Person).await.unwrap(), 0);
        assert_eq!(store.count_edges(EdgeType::Staff).await.unwrap(), 0);
        assert!(store.has_constraint(&name).await.unwrap());
        store.create_node(&NodeRef::person(5), &json!({})).await.unwrap();
    }
}
