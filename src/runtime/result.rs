/// Execution trace returned to callers

use crate::error::{EngineError, ErrorCategory};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
}

/// One visited node, in visit order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub node_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,
}

impl Step {
    /// Bookend step for the implicit start/end markers.
    pub fn bookend(node_id: &str, label: &str, description: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            kind: node_id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            status: StepStatus::Completed,
            output: None,
        }
    }
}

/// Why a run stopped early. Only the category is serialised.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    pub node_id: String,
    pub category: ErrorCategory,
    #[serde(skip)]
    pub error: EngineError,
}

impl RunFailure {
    pub fn new(node_id: impl Into<String>, error: EngineError) -> Self {
        Self {
            node_id: node_id.into(),
            category: error.category(),
            error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub execution_id: Uuid,
    pub status: ExecutionStatus,
    pub executed_at: DateTime<Utc>,
    pub steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RunFailure>,
}

impl ExecutionResult {
    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    /// Node ids in visit order.
    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.node_id.as_str()).collect()
    }

    /// Context output published by `node_id`, if it ran.
    pub fn output_of(&self, node_id: &str) -> Option<&Map<String, Value>> {
        self.steps
            .iter()
            .find(|step| step.node_id == node_id)
            .and_then(|step| step.output.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialises_camel_case_without_error_text() {
        let result = ExecutionResult {
            execution_id: Uuid::nil(),
            status: ExecutionStatus::Failed,
            executed_at: Utc::now(),
            steps: vec![Step::bookend("start", "Start", "")],
            failure: Some(RunFailure::new("weather-api", EngineError::integration(
                "temperature",
                anyhow::anyhow!("secret upstream detail"),
            ))),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], json!("failed"));
        assert_eq!(value["steps"][0], json!({
            "nodeId": "start", "type": "start", "label": "Start", "status": "completed"
        }));
        assert_eq!(value["failure"], json!({ "nodeId": "weather-api", "category": "integration" }));
        assert!(!value.to_string().contains("secret upstream detail"));
    }
}
