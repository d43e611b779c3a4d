/// Condition node: evaluates `conditionExpression` and publishes the boolean
/// under its single output field. The published boolean selects the outgoing branch.

use super::expression::{self, Operator};
use super::{not_prepared, require_present, require_str, single_output_field, NodeExecutor, NodeKind, NodeOutput};
use crate::error::EngineError;
use crate::workflow::types::ExecutionContext;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

const EXECUTOR: &str = "condition";

/// Metadata key holding the expression template.
pub const EXPRESSION_FIELD: &str = "conditionExpression";
/// Metadata key holding the operator name.
pub const OPERATOR_FIELD: &str = "operator";

#[derive(Debug, Clone)]
struct ConditionInputs {
    expression: String,
    operator: Operator,
}

#[derive(Debug, Default)]
pub struct ConditionExecutor {
    args: ExecutionContext,
    inputs: Option<ConditionInputs>,
    output_field: Option<String>,
}

impl ConditionExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeExecutor for ConditionExecutor {
    fn kind(&self) -> NodeKind {
        NodeKind::Condition
    }

    fn set_args(&mut self, args: ExecutionContext) {
        self.args = args;
    }

    fn validate_and_parse(&mut self, required_fields: &[String]) -> Result<(), EngineError> {
        for field in required_fields {
            require_present(EXECUTOR, &self.args, field)?;
        }

        let expression = require_str(EXECUTOR, &self.args, EXPRESSION_FIELD)?.to_string();
        let operator_name = require_str(EXECUTOR, &self.args, OPERATOR_FIELD)?;
        let operator = Operator::from_name(operator_name).ok_or_else(|| {
            EngineError::validation(
                EXECUTOR,
                OPERATOR_FIELD,
                format!("unsupported operator '{}'", operator_name),
            )
        })?;

        self.inputs = Some(ConditionInputs { expression, operator });
        Ok(())
    }

    fn set_output_fields(&mut self, fields: Vec<String>) -> Result<(), EngineError> {
        self.output_field = Some(single_output_field(EXECUTOR, fields)?);
        Ok(())
    }

    async fn execute(&self, _cancel: &CancellationToken) -> Result<NodeOutput, EngineError> {
        let (Some(inputs), Some(field)) = (&self.inputs, &self.output_field) else {
            return Err(not_prepared(EXECUTOR));
        };

        let met = expression::evaluate(&inputs.expression, self.args.as_map(), inputs.operator)?;
        tracing::debug!("Condition '{}' ({}) → {}", inputs.expression, inputs.operator.name(), met);

        let mut output = NodeOutput::new();
        output.insert(field.clone(), Value::Bool(met));
        Ok(output)
    }
}
