/// Workflow management and execution REST API endpoints
///
/// CRUD over stored workflow definitions plus the execute endpoint. Every write
/// drops the compiled copy from the registry so the next run sees the change.

use crate::{
    error::{EngineError, ErrorCategory},
    runtime::engine::ExecutionEngine,
    workflow::{registry::WorkflowRegistry, storage::WorkflowStorage, types::Workflow},
};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Workflow storage for persistence
    pub storage: WorkflowStorage,
    /// Compiled workflow cache shared with the engine
    pub registry: Arc<WorkflowRegistry>,
    pub engine: Arc<ExecutionEngine>,
    /// Deadline after which a run's cancellation token fires
    pub run_timeout: Duration,
}

/// Response for workflow creation/update operations
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub id: String,
    pub message: String,
}

/// Request body for workflow creation and update
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    pub workflow: Workflow,
}

/// Request body for workflow execution
#[derive(Debug, Deserialize)]
pub struct ExecuteWorkflowRequest {
    #[serde(rename = "formData", default)]
    pub form_data: Map<String, Value>,
}

/// JSON body extractor whose rejections answer like every other client error.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Error response carrying only a category name: `{"error": "<category>"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str) -> Self {
        Self { status, error }
    }

    fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCategory::Validation.as_str())
    }

    fn not_found() -> Self {
        Self::from(ErrorCategory::NotFound)
    }

    fn conflict() -> Self {
        Self::new(StatusCode::CONFLICT, "conflict")
    }

    fn internal() -> Self {
        Self::from(ErrorCategory::Internal)
    }
}

/// HTTP status for an error category.
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ErrorCategory> for ApiError {
    fn from(category: ErrorCategory) -> Self {
        Self::new(status_for(category), category.as_str())
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        if error.category() == ErrorCategory::Internal {
            tracing::error!("Request failed: {:#}", anyhow::Error::from(error));
            return Self::internal();
        }
        Self::from(error.category())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        Self::bad_request()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.error }))).into_response()
    }
}

/// Create workflow management routes
///
/// Sets up the REST API endpoints for workflow CRUD operations and execution.
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", get(list_workflows).post(create_workflow))
        .route(
            "/api/workflows/{id}",
            get(get_workflow).put(update_workflow).delete(delete_workflow),
        )
        .route("/api/workflows/{id}/execute", post(execute_workflow))
}

/// Create a new workflow
///
/// POST /api/workflows
/// Body: { "workflow": { "id": "...", "name": "...", "nodes": [...], "edges": [...] } }
async fn create_workflow(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<WorkflowResponse>), ApiError> {
    let workflow = payload.workflow;

    if workflow.id.is_empty() || workflow.name.is_empty() {
        return Err(ApiError::bad_request());
    }

    match state.storage.get_workflow(&workflow.id).await {
        Ok(Some(_)) => return Err(ApiError::conflict()),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to check workflow {}: {}", workflow.id, e);
            return Err(ApiError::internal());
        }
    }

    if let Err(e) = state.storage.save_workflow(&workflow).await {
        tracing::error!("Failed to save workflow: {}", e);
        return Err(ApiError::internal());
    }
    state.registry.invalidate(&workflow.id);

    tracing::info!("🔥 Created workflow: {} ({})", workflow.id, workflow.name);

    Ok((
        StatusCode::CREATED,
        Json(WorkflowResponse {
            id: workflow.id.clone(),
            message: format!("Workflow '{}' created successfully", workflow.name),
        }),
    ))
}

/// List all workflows
///
/// GET /api/workflows
/// Returns: { "workflows": [{ "id": "...", "name": "...", "createdAt": "...", "updatedAt": "..." }] }
async fn list_workflows(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.storage.list_workflows().await {
        Ok(workflows) => Ok(Json(json!({ "workflows": workflows }))),
        Err(e) => {
            tracing::error!("Failed to list workflows: {}", e);
            Err(ApiError::internal())
        }
    }
}

/// Get a specific workflow by ID
///
/// GET /api/workflows/{id}
/// Served through the compiled cache, so it reflects what a run would execute.
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state.engine.workflow(&id).await?;
    Ok(Json(workflow))
}

/// Create or replace a workflow
///
/// PUT /api/workflows/{id}
/// Body: { "workflow": { ... } }; the id in the URL wins over the body.
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<CreateWorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let mut workflow = payload.workflow;
    workflow.id = id.clone();

    if workflow.name.is_empty() {
        return Err(ApiError::bad_request());
    }

    if let Err(e) = state.storage.save_workflow(&workflow).await {
        tracing::error!("Failed to update workflow: {}", e);
        return Err(ApiError::internal());
    }
    state.registry.invalidate(&id);

    tracing::info!("🔥 Updated workflow: {} ({})", workflow.id, workflow.name);

    Ok(Json(WorkflowResponse {
        id,
        message: format!("Workflow '{}' updated successfully", workflow.name),
    }))
}

/// Delete a workflow
///
/// DELETE /api/workflows/{id}
async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.registry.invalidate(&id);

    match state.storage.delete_workflow(&id).await {
        Ok(true) => {
            tracing::info!("Deleted workflow: {}", id);
            Ok(Json(json!({ "message": "Workflow deleted successfully" })))
        }
        Ok(false) => Err(ApiError::not_found()),
        Err(e) => {
            tracing::error!("Failed to delete workflow: {}", e);
            Err(ApiError::internal())
        }
    }
}

/// Execute a workflow
///
/// POST /api/workflows/{id}/execute
/// Body: { "formData": { "name": "...", "email": "...", "city": "...", ... } }
///
/// A failed run still returns its execution result, with the status code of
/// the failure's category.
async fn execute_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<ExecuteWorkflowRequest>,
) -> Result<Response, ApiError> {
    let cancel = CancellationToken::new();
    let deadline = {
        let cancel = cancel.clone();
        let timeout = state.run_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::warn!("⏰ Run exceeded {:?}, cancelling", timeout);
            cancel.cancel();
        })
    };

    let result = state.engine.run(&cancel, &id, payload.form_data).await;
    deadline.abort();

    let result = result?;
    let status = match &result.failure {
        None => StatusCode::OK,
        Some(failure) => {
            tracing::warn!("Workflow {} failed at '{}': {}", id, failure.node_id, failure.error);
            status_for(failure.category)
        }
    };

    Ok((status, Json(result)).into_response())
}
