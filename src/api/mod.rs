/// HTTP API Layer
///
/// REST endpoints for workflow management and execution.

// Workflow management and execution endpoints (POST/GET/PUT/DELETE)
pub mod workflows;

// Re-export router builder and shared state
pub use workflows::{create_workflow_routes, AppState};
