/// Workflow loading seam
///
/// The engine only needs to load a workflow by id; persistence details stay
/// behind this trait. [`MemoryWorkflowStore`] backs tests and embedded use.

use crate::error::EngineError;
use crate::workflow::types::Workflow;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Source of workflow definitions consumed by the registry.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load a workflow with all of its nodes and edges.
    ///
    /// Fails with [`EngineError::NotFound`] when the id is unknown.
    async fn load(&self, workflow_id: &str) -> Result<Workflow, EngineError>;
}

/// Process-local workflow store
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    workflows: RwLock<HashMap<String, Workflow>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `workflows`.
    pub fn with_workflows(workflows: impl IntoIterator<Item = Workflow>) -> Self {
        let workflows = workflows
            .into_iter()
            .map(|workflow| (workflow.id.clone(), workflow))
            .collect();
        Self {
            workflows: RwLock::new(workflows),
        }
    }

    /// Insert or replace a workflow.
    pub async fn insert(&self, workflow: Workflow) {
        self.workflows
            .write()
            .await
            .insert(workflow.id.clone(), workflow);
    }

    pub async fn remove(&self, workflow_id: &str) -> bool {
        self.workflows.write().await.remove(workflow_id).is_some()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn load(&self, workflow_id: &str) -> Result<Workflow, EngineError> {
        self.workflows
            .read()
            .await
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("workflow", workflow_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(id: &str) -> Workflow {
        Workflow {
            id: id.to_string(),
            name: format!("workflow {id}"),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[tokio::test]
    async fn memory_store_loads_inserted_workflows() {
        let store = MemoryWorkflowStore::with_workflows([workflow("wf-1")]);
        store.insert(workflow("wf-2")).await;

        assert_eq!(store.load("wf-1").await.unwrap().id, "wf-1");
        assert_eq!(store.load("wf-2").await.unwrap().name, "workflow wf-2");
    }

    #[tokio::test]
    async fn memory_store_reports_unknown_ids_as_not_found() {
        let store = MemoryWorkflowStore::new();
        store.insert(workflow("wf-1")).await;
        assert!(store.remove("wf-1").await);

        let err = store.load("wf-1").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { what: "workflow", .. }));
    }
}
