/// `{{name}}` placeholder rendering shared by condition expressions and mail templates.

use serde_json::Value;

/// Result of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    /// Placeholder names the resolver could not supply; left verbatim in `text`.
    pub unresolved: Vec<String>,
}

/// Replace every `{{name}}` token using `resolve`.
///
/// Whitespace inside the braces is ignored. An unterminated `{{` is copied through as text.
pub fn render<F>(template: &str, mut resolve: F) -> Rendered
where
    F: FnMut(&str) -> Option<String>,
{
    let mut text = String::with_capacity(template.len());
    let mut unresolved = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        text.push_str(&rest[..open]);

        let token = &rest[open..open + 2 + close + 2];
        let name = rest[open + 2..open + 2 + close].trim();
        match resolve(name) {
            Some(value) => text.push_str(&value),
            None => {
                text.push_str(token);
                unresolved.push(name.to_string());
            }
        }
        rest = &rest[open + 2 + close + 2..];
    }
    text.push_str(rest);

    Rendered { text, unresolved }
}

/// Textual form of a context value when substituted into a template.
///
/// Numbers use the shortest round-trip decimal without an exponent, strings are
/// inserted without quotes and composite values fall back to their JSON text.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "nil".to_string(),
        other => other.to_string(),
    }
}
