/// Condition expression evaluation
///
/// An expression template such as `{{temperature}} {{operator}} {{threshold}}` is
/// first rendered against the context, then evaluated by an embedded Lua
/// interpreter with the host-access libraries removed. The result must be a boolean.

use crate::error::EngineError;
use crate::nodes::template::{self, format_value};
use serde_json::{Map, Value};

/// Placeholder replaced by the comparison operator's symbol.
pub const OPERATOR_PLACEHOLDER: &str = "operator";

/// Comparison operators accepted by condition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equals,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Self::GreaterThan,
        Self::LessThan,
        Self::Equals,
        Self::GreaterThanOrEqual,
        Self::LessThanOrEqual,
    ];

    /// Name used in node metadata (`operator` field).
    pub fn name(&self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Equals => "equals",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThanOrEqual => "less_than_or_equal",
        }
    }

    /// Lua comparison symbol substituted for `{{operator}}`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equals => "==",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Render `template` against `bindings` and evaluate it to a boolean.
///
/// Every placeholder must resolve: `{{operator}}` maps to `operator`'s symbol,
/// any other name must be a key in `bindings`.
pub fn evaluate(
    template: &str,
    bindings: &Map<String, Value>,
    operator: Operator,
) -> Result<bool, EngineError> {
    let rendered = template::render(template, |name| {
        if name == OPERATOR_PLACEHOLDER {
            Some(operator.symbol().to_string())
        } else {
            bindings.get(name).map(format_value)
        }
    });

    if !rendered.unresolved.is_empty() {
        return Err(EngineError::Expression(format!(
            "unresolved placeholders in '{}': {}",
            template,
            rendered.unresolved.join(", ")
        )));
    }

    tracing::debug!("🧮 Evaluating condition: {}", rendered.text);
    eval_boolean(&rendered.text)
}

/// Evaluate a fully rendered expression in a fresh sandboxed interpreter.
pub fn eval_boolean(source: &str) -> Result<bool, EngineError> {
    let lua = sandbox()?;

    let value = lua
        .load(source)
        .set_name("condition")
        .eval::<mlua::Value>()
        .map_err(|e| EngineError::Expression(format!("failed to evaluate '{}': {}", source, e)))?;

    match value {
        mlua::Value::Boolean(result) => Ok(result),
        other => Err(EngineError::Expression(format!(
            "'{}' evaluated to {} instead of a boolean",
            source,
            other.type_name()
        ))),
    }
}

fn sandbox() -> Result<mlua::Lua, EngineError> {
    let lua = mlua::Lua::new();
    {
        let globals = lua.globals();
        for name in ["os", "io", "debug", "package", "require", "dofile", "loadfile", "load"] {
            globals
                .set(name, mlua::Nil)
                .map_err(|e| EngineError::Expression(format!("failed to prepare interpreter: {}", e)))?;
        }
    }
    Ok(lua)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEMPLATE: &str = "{{temperature}} {{operator}} {{threshold}}";

    fn bindings(temperature: Value, threshold: Value) -> Map<String, Value> {
        json!({ "temperature": temperature, "threshold": threshold })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn operator_truth_table() {
        let cases = [
            (Operator::GreaterThan, 28.5, 25, true),
            (Operator::GreaterThan, 25.0, 25, false),
            (Operator::LessThan, 20.0, 25, true),
            (Operator::LessThan, 25.0, 25, false),
            (Operator::Equals, 25.0, 25, true),
            (Operator::Equals, 24.9, 25, false),
            (Operator::GreaterThanOrEqual, 25.0, 25, true),
            (Operator::GreaterThanOrEqual, 24.0, 25, false),
            (Operator::LessThanOrEqual, 25.0, 25, true),
            (Operator::LessThanOrEqual, 26.0, 25, false),
        ];

        for (operator, temperature, threshold, expected) in cases {
            let result = evaluate(TEMPLATE, &bindings(json!(temperature), json!(threshold)), operator);
            assert_eq!(result.unwrap(), expected, "{} {} {}", temperature, operator.symbol(), threshold);
        }
    }

    #[test]
    fn operator_names_are_closed() {
        assert_eq!(Operator::from_name("greater_than_or_equal"), Some(Operator::GreaterThanOrEqual));
        assert_eq!(Operator::from_name("between"), None);
        assert_eq!(Operator::from_name(">"), None);
    }

    #[test]
    fn missing_binding_is_an_expression_error() {
        let only_temperature = json!({ "temperature": 20 }).as_object().cloned().unwrap();
        let err = evaluate(TEMPLATE, &only_temperature, Operator::LessThan).unwrap_err();
        match err {
            EngineError::Expression(message) => assert!(message.contains("threshold")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_boolean_result_is_rejected() {
        assert!(matches!(eval_boolean("1 + 2"), Err(EngineError::Expression(_))));
        assert!(matches!(eval_boolean("25 >"), Err(EngineError::Expression(_))));
    }

    #[test]
    fn host_access_is_removed() {
        assert!(eval_boolean("os.time() > 0").is_err());
        assert!(eval_boolean("io == nil").unwrap());
    }
}
