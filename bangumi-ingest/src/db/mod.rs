//! Graph store persistence
//!
//! The property graph lives in a SQLite database with two tables:
//!
//! - `nodes(node_id, label, node_key, properties)`
//! - `edges(edge_id, rel_type, source_id, target_id, label, properties)`
//!
//! `properties` columns hold a JSON object. Edges are unique per
//! `(rel_type, source_id, target_id, label)`, which is what makes relation
//! writes merge-if-absent.

pub mod graph_store;
pub mod graph_writer;
pub mod sqlite_store;

pub use graph_store::{EdgeType, GraphStore, NodeLabel, NodeRef};
pub use graph_writer::GraphWriter;
pub use sqlite_store::SqliteGraphStore;

use bangumi_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Open (or create) the graph database file
///
/// A single connection: the ingestion pipeline is the only writer.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let newly_created = !db_path.exists();

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        tracing::info!("Initialized new graph database: {}", db_path.display());
    } else {
        tracing::info!("Opened existing graph database: {}", db_path.display());
    }

    init_tables(&pool).await?;

    Ok(pool)
}

/// In-memory graph database (tests and dry runs)
///
/// The pool never recycles its only connection, otherwise the in-memory
/// database would vanish with it.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the node and edge tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS nodes (
            node_id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL,
            node_key TEXT NOT NULL,
            properties TEXT NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_label_key ON nodes(label, node_key)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS edges (
            edge_id INTEGER PRIMARY KEY AUTOINCREMENT,
            rel_type TEXT NOT NULL,
            source_id INTEGER NOT NULL REFERENCES nodes(node_id) ON DELETE CASCADE,
            target_id INTEGER NOT NULL REFERENCES nodes(node_id) ON DELETE CASCADE,
            label TEXT NOT NULL DEFAULT '',
            properties TEXT NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uq_edges_identity
        ON edges(rel_type, source_id, target_id, label)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Graph tables initialized (nodes, edges)");

    Ok(())
}
