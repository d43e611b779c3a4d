/// flowrunner: workflow graph execution engine
///
/// Runs editor-authored workflow graphs (form → weather lookup → condition →
/// email) one node at a time, following the edge selected by each node's
/// boolean outcome, and returns a step-by-step execution trace.

// Core configuration and setup
pub mod config;

// Engine error taxonomy
pub mod error;

// Workflow management layer - definitions, storage and compiled registry
pub mod workflow;

// Node executors and the executor registry
pub mod nodes;

// Outbound geocoding, weather and mail capabilities
pub mod integrations;

// Runtime execution engine - graph index and execution loop
pub mod runtime;

// HTTP API layer - REST endpoints for workflow management and execution
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use error::{EngineError, ErrorCategory};
pub use runtime::{ExecutionEngine, ExecutionResult};
pub use server::start_server;
pub use workflow::{Edge, Node, Workflow};
