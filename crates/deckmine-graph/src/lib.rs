//! Deckmine Graph - Relational-to-graph migration
//!
//! One-shot ETL: copies the `entities` and `relations` tables from the
//! relational store into a SurrealDB graph. Relations whose source or
//! target entity is missing are skipped with a warning rather than
//! failing the migration.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{info, warn};

use deckmine_core::{AppConfig, DeckmineError, Result};

// ============================================================================
// Row and record types
// ============================================================================

/// Entity row from the relational store
#[derive(Debug, Clone, FromRow)]
struct EntityRow {
    entity_id: i64,
    entity_name: String,
    entity_type: String,
    description: Option<String>,
}

/// Relation row joined to its endpoint entities.
///
/// Endpoint columns are nullable: a dangling foreign key surfaces as
/// `None` and the relation is skipped.
#[derive(Debug, Clone, FromRow)]
struct RelationRow {
    relation_id: i64,
    relation_type: String,
    description: Option<String>,
    source_id: Option<i64>,
    source_name: Option<String>,
    target_id: Option<i64>,
    target_name: Option<String>,
}

impl RelationRow {
    /// Both endpoint ids, when present
    fn endpoints(&self) -> Option<(i64, i64)> {
        Some((self.source_id?, self.target_id?))
    }
}

/// Graph node record for an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntityNode {
    name: String,
    entity_type: String,
    description: Option<String>,
}

/// Counts produced by one migration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub entities: u64,
    pub relations: u64,
    pub skipped: u64,
}

// ============================================================================
// Migrator
// ============================================================================

/// Copies entities and relations from PostgreSQL into SurrealDB
pub struct GraphMigrator {
    pg: PgPool,
    graph: Surreal<Client>,
}

impl GraphMigrator {
    /// Connect to both stores
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(config.database.pool_size)
            .connect(&config.database.postgres_url)
            .await
            .map_err(|e| DeckmineError::Database(format!("PostgreSQL connection failed: {e}")))?;

        // the surrealdb crate adds the scheme itself
        let url = config
            .graph
            .url
            .strip_prefix("ws://")
            .or_else(|| config.graph.url.strip_prefix("wss://"))
            .unwrap_or(&config.graph.url);

        let graph = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| DeckmineError::Graph(format!("SurrealDB connection failed: {e}")))?;

        graph
            .signin(Root {
                username: &config.graph.user,
                password: &config.graph.pass,
            })
            .await
            .map_err(|e| DeckmineError::Graph(format!("SurrealDB auth failed: {e}")))?;

        graph
            .use_ns(&config.graph.namespace)
            .use_db(&config.graph.database)
            .await
            .map_err(|e| DeckmineError::Graph(format!("SurrealDB namespace error: {e}")))?;

        Ok(Self { pg, graph })
    }

    /// Initialize the graph schema (run once on setup)
    pub async fn init_schema(&self) -> Result<()> {
        self.graph
            .query(
                r#"
                DEFINE TABLE entity SCHEMAFULL;
                DEFINE FIELD name ON entity TYPE string;
                DEFINE FIELD entity_type ON entity TYPE string;
                DEFINE FIELD description ON entity TYPE option<string>;
                DEFINE INDEX idx_entity_name ON entity FIELDS name;
            "#,
            )
            .await
            .map_err(|e| DeckmineError::Graph(format!("Schema init failed: {e}")))?;

        Ok(())
    }

    /// Run the full migration: entities first, then relations
    pub async fn migrate(&self) -> Result<MigrationReport> {
        let entities = self.migrate_entities().await?;
        let (relations, skipped) = self.migrate_relations().await?;

        let report = MigrationReport {
            entities,
            relations,
            skipped,
        };
        info!(?report, "migration finished");
        Ok(report)
    }

    /// Copy every entity row into a graph node keyed by its id
    pub async fn migrate_entities(&self) -> Result<u64> {
        let rows: Vec<EntityRow> = sqlx::query_as(
            "SELECT entity_id, entity_name, entity_type, description FROM entities",
        )
        .fetch_all(&self.pg)
        .await
        .map_err(|e| DeckmineError::Database(format!("select entities: {e}")))?;

        let mut migrated = 0u64;
        for row in rows {
            let node = EntityNode {
                name: row.entity_name,
                entity_type: row.entity_type,
                description: row.description,
            };

            let _: Option<EntityNode> = self
                .graph
                .create(("entity", row.entity_id))
                .content(node)
                .await
                .map_err(|e| {
                    DeckmineError::Migration(format!("create entity {}: {e}", row.entity_id))
                })?;

            migrated += 1;
        }

        info!(migrated, "entities migrated");
        Ok(migrated)
    }

    /// Copy relation rows into graph edges, skipping dangling endpoints.
    ///
    /// Returns (migrated, skipped).
    pub async fn migrate_relations(&self) -> Result<(u64, u64)> {
        let rows: Vec<RelationRow> = sqlx::query_as(
            r#"
            SELECT r.relation_id, r.relation_type, r.description,
                   e1.entity_id AS source_id, e1.entity_name AS source_name,
                   e2.entity_id AS target_id, e2.entity_name AS target_name
            FROM relations r
            LEFT JOIN entities e1 ON r.source_entity_id = e1.entity_id
            LEFT JOIN entities e2 ON r.target_entity_id = e2.entity_id
            "#,
        )
        .fetch_all(&self.pg)
        .await
        .map_err(|e| DeckmineError::Database(format!("select relations: {e}")))?;

        let mut migrated = 0u64;
        let mut skipped = 0u64;
        for row in rows {
            let Some((source_id, target_id)) = row.endpoints() else {
                warn!(
                    relation_id = row.relation_id,
                    source = ?row.source_name,
                    target = ?row.target_name,
                    "endpoint missing, relation skipped"
                );
                skipped += 1;
                continue;
            };

            // edge table is fixed; the original relation type travels as
            // a field because RELATE cannot bind the table name
            let query = format!(
                "RELATE entity:{source_id}->related->entity:{target_id} \
                 SET relation_type = $relation_type, description = $description"
            );

            self.graph
                .query(query)
                .bind(("relation_type", row.relation_type))
                .bind(("description", row.description))
                .await
                .map_err(|e| {
                    DeckmineError::Migration(format!("relate {}: {e}", row.relation_id))
                })?;

            migrated += 1;
        }

        info!(migrated, skipped, "relations migrated");
        Ok((migrated, skipped))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn relation_row(source_id: Option<i64>, target_id: Option<i64>) -> RelationRow {
        RelationRow {
            relation_id: 1,
            relation_type: "依赖".to_string(),
            description: None,
            source_id,
            source_name: source_id.map(|_| "查询优化".to_string()),
            target_id,
            target_name: target_id.map(|_| "索引".to_string()),
        }
    }

    #[test]
    fn test_endpoints_present() {
        assert_eq!(relation_row(Some(1), Some(2)).endpoints(), Some((1, 2)));
    }

    #[test]
    fn test_endpoints_missing() {
        assert_eq!(relation_row(None, Some(2)).endpoints(), None);
        assert_eq!(relation_row(Some(1), None).endpoints(), None);
    }
}
