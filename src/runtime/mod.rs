/// Runtime Execution Engine
///
/// Graph indexing, the node-by-node execution loop and the execution trace it
/// produces.

// Constant-time (node, outcome) → next node lookup
pub mod graph;

// Branch-aware execution loop
pub mod engine;

// Steps and execution results
pub mod result;

// Re-export main types
pub use engine::ExecutionEngine;
pub use graph::GraphIndex;
pub use result::{ExecutionResult, ExecutionStatus, RunFailure, Step, StepStatus};
