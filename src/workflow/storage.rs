/// SQLite persistence layer for workflow storage
///
/// Workflows are stored as a JSON definition column keyed by id, with the name
/// duplicated into its own column for listing.

use crate::error::EngineError;
use crate::workflow::{store::WorkflowStore, types::Workflow};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};

/// SQLite-based workflow storage manager
#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    pool: SqlitePool,
}

impl WorkflowStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the workflow storage schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                definition JSON NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_workflows_name
            ON workflows(name)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new workflow or update existing one
    pub async fn save_workflow(&self, workflow: &Workflow) -> Result<()> {
        let definition_json = serde_json::to_string(workflow)?;

        sqlx::query(
            r#"
            INSERT INTO workflows (id, name, definition, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                definition = excluded.definition,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.name)
        .bind(&definition_json)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Saved workflow '{}' ({} nodes, {} edges)",
            workflow.id, workflow.nodes.len(), workflow.edges.len());

        Ok(())
    }

    /// Retrieve a workflow by ID
    pub async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>> {
        let row = sqlx::query("SELECT CAST(definition AS TEXT) AS definition FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let definition_json: String = row.get("definition");
                let workflow: Workflow = serde_json::from_str(&definition_json)?;
                Ok(Some(workflow))
            }
            None => Ok(None),
        }
    }

    /// List all workflows with basic metadata
    pub async fn list_workflows(&self) -> Result<Vec<WorkflowMetadata>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name,
                CAST(created_at AS TEXT) AS created_at,
                CAST(updated_at AS TEXT) AS updated_at
            FROM workflows
            ORDER BY updated_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let workflows = rows
            .into_iter()
            .map(|row| WorkflowMetadata {
                id: row.get("id"),
                name: row.get("name"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect();

        Ok(workflows)
    }

    /// Delete a workflow by ID
    pub async fn delete_workflow(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WorkflowStore for WorkflowStorage {
    async fn load(&self, workflow_id: &str) -> Result<Workflow, EngineError> {
        self.get_workflow(workflow_id)
            .await
            .map_err(EngineError::Storage)?
            .ok_or_else(|| EngineError::not_found("workflow", workflow_id))
    }
}

/// Basic workflow metadata for listing operations
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{Edge, Node, NodeData, Position};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn storage() -> WorkflowStorage {
        // One connection: every in-memory SQLite connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let storage = WorkflowStorage::new(pool);
        storage.init_schema().await.unwrap();
        storage
    }

    fn sample(id: &str, name: &str) -> Workflow {
        Workflow {
            id: id.to_string(),
            name: name.to_string(),
            nodes: vec![Node {
                id: "form".into(),
                kind: "form".into(),
                position: Position { x: 10.0, y: 20.0 },
                data: NodeData {
                    label: "User Input".into(),
                    ..NodeData::default()
                },
            }],
            edges: vec![Edge::new("start", "form"), Edge::branch("form", "end", true)],
        }
    }

    #[tokio::test]
    async fn saved_workflow_loads_back_intact() {
        let storage = storage().await;
        let workflow = sample("wf-1", "Weather");
        storage.save_workflow(&workflow).await.unwrap();

        let loaded = storage.load("wf-1").await.unwrap();
        assert_eq!(loaded, workflow);
    }

    #[tokio::test]
    async fn save_upserts_by_id() {
        let storage = storage().await;
        storage.save_workflow(&sample("wf-1", "First")).await.unwrap();
        storage.save_workflow(&sample("wf-1", "Renamed")).await.unwrap();

        let listed = storage.list_workflows().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Renamed");
    }

    #[tokio::test]
    async fn missing_workflow_is_not_found() {
        let storage = storage().await;
        assert!(matches!(
            storage.load("nope").await,
            Err(EngineError::NotFound { .. })
        ));
        assert!(!storage.delete_workflow("nope").await.unwrap());
    }
}
