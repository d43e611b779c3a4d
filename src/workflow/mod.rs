/// Workflow Management Layer
///
/// Workflow definitions, the loading seam used by the engine, SQLite
/// persistence and the compiled-workflow cache.

// Core workflow type definitions
pub mod types;

// Loading seam plus in-memory store
pub mod store;

// SQLite persistence layer for workflow storage
pub mod storage;

// Compiled workflow cache using ArcSwap
pub mod registry;

// Re-export commonly used types
pub use registry::{CompiledWorkflow, WorkflowRegistry};
pub use store::{MemoryWorkflowStore, WorkflowStore};
pub use types::{BranchSelector, Edge, ExecutionContext, Node, NodeData, Workflow};
