/// Compiled workflow cache using ArcSwap
///
/// Workflows are loaded from the [`WorkflowStore`] on first use, indexed once and
/// kept as `Arc<CompiledWorkflow>`. Readers never block: every update swaps the
/// whole map pointer, and runs already holding a compiled workflow keep their
/// snapshot until they finish.

use crate::error::EngineError;
use crate::runtime::graph::GraphIndex;
use crate::workflow::{store::WorkflowStore, types::Workflow};
use arc_swap::ArcSwap;
use std::{collections::HashMap, sync::Arc};

/// Workflow definition plus its traversal index
#[derive(Debug)]
pub struct CompiledWorkflow {
    pub workflow: Workflow,
    pub index: GraphIndex,
}

impl CompiledWorkflow {
    pub fn compile(workflow: Workflow) -> Self {
        let index = GraphIndex::build(&workflow);
        Self { workflow, index }
    }
}

/// Cached workflows plus a per-id write generation.
///
/// Both live in one snapshot so a reload can check the generation and insert in
/// the same swap.
#[derive(Default)]
struct Cache {
    /// Key: workflow_id, Value: compiled, immutable snapshot
    workflows: HashMap<String, Arc<CompiledWorkflow>>,
    /// Bumped by every invalidation of the id
    generations: HashMap<String, u64>,
}

impl Cache {
    fn generation(&self, workflow_id: &str) -> u64 {
        self.generations.get(workflow_id).copied().unwrap_or(0)
    }
}

/// Lock-free cache of compiled workflows backed by a store
pub struct WorkflowRegistry {
    cache: ArcSwap<Cache>,
    store: Arc<dyn WorkflowStore>,
}

impl WorkflowRegistry {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self {
            cache: ArcSwap::from_pointee(Cache::default()),
            store,
        }
    }

    /// Compiled workflow for `workflow_id`, loading it from the store on a cache miss.
    pub async fn get(&self, workflow_id: &str) -> Result<Arc<CompiledWorkflow>, EngineError> {
        if let Some(compiled) = self.cache.load().workflows.get(workflow_id) {
            return Ok(compiled.clone());
        }
        self.reload_workflow(workflow_id).await
    }

    /// Load `workflow_id` from the store and replace any cached copy.
    ///
    /// If the id is invalidated while the load is in flight, the loaded copy is
    /// returned to the caller but not cached.
    pub async fn reload_workflow(&self, workflow_id: &str) -> Result<Arc<CompiledWorkflow>, EngineError> {
        let generation = self.cache.load().generation(workflow_id);
        let workflow = self.store.load(workflow_id).await?;
        let compiled = Arc::new(CompiledWorkflow::compile(workflow));

        let previous = self.cache.rcu(|current| {
            if current.generation(workflow_id) != generation {
                return Arc::clone(current);
            }
            let mut workflows = current.workflows.clone();
            workflows.insert(workflow_id.to_string(), compiled.clone());
            Arc::new(Cache {
                workflows,
                generations: current.generations.clone(),
            })
        });

        if previous.generation(workflow_id) == generation {
            tracing::info!("Compiled workflow '{}' ({} nodes)", workflow_id, compiled.index.node_count());
        } else {
            tracing::debug!("Workflow '{}' changed during load, not caching", workflow_id);
        }
        Ok(compiled)
    }

    /// Drop the cached copy so the next `get` reads the store again.
    ///
    /// Loads already in flight for the id will not repopulate the cache.
    pub fn invalidate(&self, workflow_id: &str) {
        self.cache.rcu(|current| {
            let mut workflows = current.workflows.clone();
            workflows.remove(workflow_id);
            let mut generations = current.generations.clone();
            *generations.entry(workflow_id.to_string()).or_insert(0) += 1;
            Cache { workflows, generations }
        });
        tracing::debug!("Invalidated cached workflow '{}'", workflow_id);
    }

    /// Ids currently held in memory.
    pub fn cached_ids(&self) -> Vec<String> {
        self.cache.load().workflows.keys().cloned().collect()
    }
}

impl std::fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("cached", &self.cached_ids())
            .finish()
    }
}
