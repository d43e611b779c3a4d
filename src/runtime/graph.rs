/// Graph index for branch-aware traversal
///
/// Flattens a workflow's node and edge lists into two hash maps so every step
/// of a run resolves `(current node, outcome) → next node` in constant time.

use crate::workflow::types::{Node, Workflow};
use std::collections::HashMap;

/// Read-only lookup tables built once per workflow snapshot
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    /// Node id → node definition
    nodes_by_id: HashMap<String, Node>,
    /// Source node id → (branch outcome → target node id)
    edges_by_source: HashMap<String, HashMap<bool, String>>,
}

impl GraphIndex {
    /// Build the index in a single pass over nodes and edges.
    ///
    /// When two edges share a `(source, selector)` pair the later one wins.
    pub fn build(workflow: &Workflow) -> Self {
        let mut nodes_by_id = HashMap::with_capacity(workflow.nodes.len());
        for node in &workflow.nodes {
            nodes_by_id.insert(node.id.clone(), node.clone());
        }

        let mut edges_by_source: HashMap<String, HashMap<bool, String>> = HashMap::new();
        for edge in &workflow.edges {
            let outcome = edge.source_handle.outcome();
            let previous = edges_by_source
                .entry(edge.source.clone())
                .or_default()
                .insert(outcome, edge.target.clone());

            if let Some(previous) = previous {
                tracing::warn!(
                    "Workflow '{}': edge {} -[{}]-> {} replaces {} -[{}]-> {}",
                    workflow.id, edge.source, outcome, edge.target, edge.source, outcome, previous
                );
            }
        }

        tracing::debug!("Indexed workflow '{}': {} nodes, {} branching sources",
            workflow.id, nodes_by_id.len(), edges_by_source.len());

        Self {
            nodes_by_id,
            edges_by_source,
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes_by_id.get(node_id)
    }

    /// Target of the edge leaving `source` under `outcome`, if any.
    pub fn next(&self, source: &str, outcome: bool) -> Option<&str> {
        self.edges_by_source
            .get(source)
            .and_then(|targets| targets.get(&outcome))
            .map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.nodes_by_id.len()
    }
}
