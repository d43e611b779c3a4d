/// Branch-aware workflow execution engine
///
/// Walks a compiled workflow from the `start` node, one node at a time. After each
/// node the first boolean it published picks the outgoing edge; a missing edge or
/// the `end` sentinel completes the run. Any node error, or an edge into a node the
/// workflow does not define, fails the run, keeping the steps recorded so far.

use crate::error::EngineError;
use crate::nodes::ExecutorRegistry;
use crate::runtime::result::{ExecutionResult, ExecutionStatus, RunFailure, Step, StepStatus};
use crate::workflow::registry::{CompiledWorkflow, WorkflowRegistry};
use crate::workflow::types::{ExecutionContext, Node, Workflow, END_NODE_ID, START_NODE_ID};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    registry: Arc<WorkflowRegistry>,
    executors: Arc<ExecutorRegistry>,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<WorkflowRegistry>, executors: Arc<ExecutorRegistry>) -> Self {
        Self { registry, executors }
    }

    /// Load a workflow definition through the compiled cache.
    pub async fn workflow(&self, workflow_id: &str) -> Result<Workflow, EngineError> {
        Ok(self.registry.get(workflow_id).await?.workflow.clone())
    }

    /// Run `workflow_id` against `form_data`.
    ///
    /// Only loading errors are returned as `Err`; node failures come back as a
    /// failed [`ExecutionResult`] carrying the steps that completed.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        workflow_id: &str,
        form_data: Map<String, Value>,
    ) -> Result<ExecutionResult, EngineError> {
        let compiled = self.registry.get(workflow_id).await?;
        Ok(self.execute(cancel, &compiled, form_data).await)
    }

    /// Run an already compiled workflow.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        compiled: &CompiledWorkflow,
        form_data: Map<String, Value>,
    ) -> ExecutionResult {
        let execution_id = Uuid::new_v4();
        let executed_at = Utc::now();
        let started = std::time::Instant::now();
        let index = &compiled.index;

        tracing::info!("🚀 Starting execution {} of workflow '{}'", execution_id, compiled.workflow.id);

        let mut steps = vec![bookend(index.node(START_NODE_ID), START_NODE_ID)];
        let mut context = ExecutionContext::from_form(form_data);
        let mut current = START_NODE_ID.to_string();
        let mut outcome = false;

        let failure = loop {
            if cancel.is_cancelled() {
                break Some(RunFailure::new(current, EngineError::Cancelled));
            }

            let target = match index.next(&current, outcome) {
                None => break None,
                Some(END_NODE_ID) => break None,
                Some(target) => target,
            };

            let Some(node) = index.node(target) else {
                tracing::error!("❌ Edge from '{}' points at unknown node '{}'", current, target);
                let error = EngineError::configuration(
                    "graph",
                    format!("edge from '{}' targets unknown node '{}'", current, target),
                );
                break Some(RunFailure::new(current, error));
            };

            match self.run_node(cancel, node, &context).await {
                Ok((step, next_context, next_outcome)) => {
                    steps.push(step);
                    context = next_context;
                    outcome = next_outcome;
                    current = node.id.clone();
                }
                Err(error) => {
                    tracing::error!("❌ Node '{}' failed: {}", node.id, error);
                    break Some(RunFailure::new(node.id.clone(), error));
                }
            }
        };

        let status = match failure {
            None => {
                steps.push(bookend(index.node(END_NODE_ID), END_NODE_ID));
                ExecutionStatus::Completed
            }
            Some(_) => ExecutionStatus::Failed,
        };

        tracing::info!("🏁 Execution {} {:?} after {} steps in {:?}",
            execution_id, status, steps.len(), started.elapsed());

        ExecutionResult {
            execution_id,
            status,
            executed_at,
            steps,
            failure,
        }
    }

    /// Configure and execute one node against a snapshot of the context.
    ///
    /// Returns the recorded step, the context after merging the node's output,
    /// and the branch outcome for the next edge lookup.
    async fn run_node(
        &self,
        cancel: &CancellationToken,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<(Step, ExecutionContext, bool), EngineError> {
        tracing::info!("▶️ Executing node '{}' ({})", node.id, node.kind);

        let node_context = context.merged(&node.data.metadata);

        let mut executor = self.executors.resolve(node)?;
        executor.set_args(node_context.clone());
        executor.validate_and_parse(&node.data.input_variables())?;
        executor.set_output_fields(node.data.output_variables())?;

        let output = executor.execute(cancel).await?;
        tracing::debug!("📤 Node '{}' output: {:?}", node.id, output);

        let outcome = output.values().find_map(Value::as_bool).unwrap_or(false);
        let next_context = node_context.merged(&output);

        let step = Step {
            node_id: node.id.clone(),
            kind: node.kind.clone(),
            label: node.data.label.clone(),
            description: node.data.description.clone(),
            status: StepStatus::Completed,
            output: Some(output),
        };

        Ok((step, next_context, outcome))
    }
}

/// Start/end marker step, labelled from the workflow's own node when it has one.
fn bookend(node: Option<&Node>, node_id: &str) -> Step {
    match node {
        Some(node) if !node.data.label.is_empty() => {
            Step::bookend(node_id, &node.data.label, &node.data.description)
        }
        _ => Step::bookend(node_id, node_id, ""),
    }
}
