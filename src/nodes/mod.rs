/// Node executors
///
/// Every executable node kind implements [`NodeExecutor`]. The engine drives an
/// executor through a fixed sequence for each visited node:
/// `set_args` → `validate_and_parse` → `set_output_fields` → `execute`.
/// Executors are created fresh per node visit by the [`ExecutorRegistry`].

pub mod condition;
pub mod email;
pub mod expression;
pub mod form;
pub mod registry;
pub mod template;
pub mod weather;

pub use registry::{Capabilities, ExecutorFactory, ExecutorRegistry};

use crate::error::EngineError;
use crate::workflow::types::{ExecutionContext, Node};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Output published by a node, keyed by declared output field (in declared order).
pub type NodeOutput = Map<String, Value>;

/// Closed set of executable node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Pass-through of submitted form fields
    Form,
    /// City → coordinates → current temperature
    WeatherApi,
    /// Boolean expression over the context
    Condition,
    /// Templated notification mail
    Email,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [Self::Form, Self::WeatherApi, Self::Condition, Self::Email];

    /// Stable identifier used for executor lookup.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::WeatherApi => "weather-api",
            Self::Condition => "condition",
            Self::Email => "email",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == id)
    }

    /// Candidate kinds for a node: its declared type first, then its id.
    ///
    /// Editor-authored graphs label some nodes with a generic type such as
    /// `integration` and identify the concrete executor through the node id.
    pub fn candidates(node: &Node) -> impl Iterator<Item = NodeKind> + '_ {
        [node.kind.as_str(), node.id.as_str()]
            .into_iter()
            .filter_map(Self::from_id)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract implemented by every node kind
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    fn kind(&self) -> NodeKind;

    /// Stable kind identifier; shared by every node of the same kind.
    fn id(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Bind the context snapshot this node runs against. Performs no validation.
    fn set_args(&mut self, args: ExecutionContext);

    /// Check every required field and parse the executor's typed inputs.
    fn validate_and_parse(&mut self, required_fields: &[String]) -> Result<(), EngineError>;

    /// Declare which output keys the caller expects back.
    fn set_output_fields(&mut self, fields: Vec<String>) -> Result<(), EngineError>;

    /// Perform the node's effect. Never mutates the bound context.
    async fn execute(&self, cancel: &CancellationToken) -> Result<NodeOutput, EngineError>;
}

/// Fetch a required field, rejecting absent and null values.
pub(crate) fn require_present<'a>(
    executor: &'static str,
    args: &'a ExecutionContext,
    field: &str,
) -> Result<&'a Value, EngineError> {
    match args.get(field) {
        None | Some(Value::Null) => Err(EngineError::validation(executor, field, "missing")),
        Some(value) => Ok(value),
    }
}

/// Fetch a required string field.
pub(crate) fn require_str<'a>(
    executor: &'static str,
    args: &'a ExecutionContext,
    field: &str,
) -> Result<&'a str, EngineError> {
    require_present(executor, args, field)?
        .as_str()
        .ok_or_else(|| EngineError::validation(executor, field, "expected a string"))
}

/// Executors that derive a single value publish it under exactly one field.
pub(crate) fn single_output_field(
    executor: &'static str,
    mut fields: Vec<String>,
) -> Result<String, EngineError> {
    if fields.len() != 1 {
        return Err(EngineError::configuration(
            executor,
            format!("expected exactly one output field, got {:?}", fields),
        ));
    }
    Ok(fields.remove(0))
}

pub(crate) fn not_prepared(executor: &'static str) -> EngineError {
    EngineError::configuration(
        executor,
        "execute called before validate_and_parse/set_output_fields",
    )
}

/// Race an outbound call against the run's cancellation token.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, EngineError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EngineError::Cancelled),
        result = call => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{NodeData, Position};
    use serde_json::json;

    fn node(id: &str, kind: &str) -> Node {
        Node {
            id: id.into(),
            kind: kind.into(),
            position: Position::default(),
            data: NodeData::default(),
        }
    }

    #[test]
    fn kind_ids_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_id(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::from_id("integration"), None);
    }

    #[test]
    fn candidates_prefer_type_then_id() {
        let integration = node("weather-api", "integration");
        assert_eq!(NodeKind::candidates(&integration).collect::<Vec<_>>(), vec![NodeKind::WeatherApi]);

        let renamed = node("check-temp", "condition");
        assert_eq!(NodeKind::candidates(&renamed).collect::<Vec<_>>(), vec![NodeKind::Condition]);

        assert_eq!(NodeKind::candidates(&node("x", "start")).count(), 0);
    }

    #[test]
    fn required_fields_reject_null_and_wrong_types() {
        let args = ExecutionContext::from_form(
            json!({ "city": "Sydney", "age": 3, "gone": null }).as_object().cloned().unwrap(),
        );

        assert_eq!(require_str("form", &args, "city").unwrap(), "Sydney");
        assert!(matches!(
            require_str("form", &args, "age"),
            Err(EngineError::Validation { field, .. }) if field == "age"
        ));
        assert!(require_present("form", &args, "gone").is_err());
        assert!(require_present("form", &args, "absent").is_err());
    }

    #[test]
    fn single_output_field_requires_exactly_one() {
        assert_eq!(single_output_field("email", vec!["emailSent".into()]).unwrap(), "emailSent");
        assert!(matches!(
            single_output_field("email", vec![]),
            Err(EngineError::Configuration { .. })
        ));
        assert!(single_output_field("email", vec!["a".into(), "b".into()]).is_err());
    }

    #[tokio::test]
    async fn cancellable_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = cancellable(&cancel, async { Ok::<_, EngineError>(1) }).await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }
}
