/// Form node: publishes submitted form fields into the run context unchanged.

use super::{not_prepared, require_present, NodeExecutor, NodeKind, NodeOutput};
use crate::error::EngineError;
use crate::workflow::types::ExecutionContext;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

const EXECUTOR: &str = "form";

#[derive(Debug, Default)]
pub struct FormExecutor {
    args: ExecutionContext,
    /// Validated `(field, value)` pairs, in declared order
    fields: Option<Vec<(String, Value)>>,
    output_fields: Vec<String>,
}

impl FormExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeExecutor for FormExecutor {
    fn kind(&self) -> NodeKind {
        NodeKind::Form
    }

    fn set_args(&mut self, args: ExecutionContext) {
        self.args = args;
    }

    fn validate_and_parse(&mut self, required_fields: &[String]) -> Result<(), EngineError> {
        let mut fields = Vec::with_capacity(required_fields.len());
        for field in required_fields {
            let value = require_present(EXECUTOR, &self.args, field)?;
            fields.push((field.clone(), value.clone()));
        }
        self.fields = Some(fields);
        Ok(())
    }

    /// Any number of output fields is accepted; each must be present in the bound context.
    fn set_output_fields(&mut self, fields: Vec<String>) -> Result<(), EngineError> {
        for field in &fields {
            require_present(EXECUTOR, &self.args, field)?;
        }
        self.output_fields = fields;
        Ok(())
    }

    async fn execute(&self, _cancel: &CancellationToken) -> Result<NodeOutput, EngineError> {
        let fields = self.fields.as_ref().ok_or_else(|| not_prepared(EXECUTOR))?;

        let mut output = NodeOutput::new();
        if self.output_fields.is_empty() {
            for (field, value) in fields {
                output.insert(field.clone(), value.clone());
            }
        } else {
            for field in &self.output_fields {
                let value = require_present(EXECUTOR, &self.args, field)?;
                output.insert(field.clone(), value.clone());
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form_args() -> ExecutionContext {
        ExecutionContext::from_form(
            json!({ "name": "Alice", "email": "alice@example.com", "city": "Sydney", "operator": "greater_than" })
                .as_object()
                .cloned()
                .unwrap(),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn publishes_declared_outputs_in_order() {
        let mut executor = FormExecutor::new();
        executor.set_args(form_args());
        executor.validate_and_parse(&strings(&["name", "email", "city"])).unwrap();
        executor.set_output_fields(strings(&["city", "name"])).unwrap();

        let output = executor.execute(&CancellationToken::new()).await.unwrap();
        assert_eq!(output.keys().collect::<Vec<_>>(), vec!["city", "name"]);
        assert_eq!(output["name"], json!("Alice"));
    }

    #[tokio::test]
    async fn falls_back_to_validated_inputs_without_outputs() {
        let mut executor = FormExecutor::new();
        executor.set_args(form_args());
        executor.validate_and_parse(&strings(&["name", "city"])).unwrap();
        executor.set_output_fields(Vec::new()).unwrap();

        let output = executor.execute(&CancellationToken::new()).await.unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(output["city"], json!("Sydney"));
    }

    #[test]
    fn missing_field_fails_validation() {
        let mut executor = FormExecutor::new();
        executor.set_args(form_args());

        let err = executor
            .validate_and_parse(&strings(&["name", "phone"]))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { field, .. } if field == "phone"));
    }
}
