/// Email node: renders `emailTemplate` against the context and sends it to the
/// context's `email` address. Publishes whether delivery succeeded.

use super::template::{self, format_value};
use super::{cancellable, not_prepared, require_present, require_str, single_output_field, NodeExecutor, NodeKind, NodeOutput};
use crate::error::EngineError;
use crate::integrations::MailSender;
use crate::workflow::types::ExecutionContext;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const EXECUTOR: &str = "email";

/// Context field holding `{subject, body}` templates.
pub const TEMPLATE_FIELD: &str = "emailTemplate";
/// Context field holding the recipient address.
pub const RECIPIENT_FIELD: &str = "email";

#[derive(Debug, Clone)]
struct EmailInputs {
    to: String,
    subject: String,
    body: String,
}

pub struct EmailExecutor {
    mailer: Arc<dyn MailSender>,
    args: ExecutionContext,
    inputs: Option<EmailInputs>,
    output_field: Option<String>,
}

impl EmailExecutor {
    pub fn new(mailer: Arc<dyn MailSender>) -> Self {
        Self {
            mailer,
            args: ExecutionContext::default(),
            inputs: None,
            output_field: None,
        }
    }

    fn render(&self, text: &str) -> String {
        let rendered = template::render(text, |key| self.args.get(key).map(format_value));
        if !rendered.unresolved.is_empty() {
            tracing::warn!("Email template left placeholders unresolved: {}", rendered.unresolved.join(", "));
        }
        rendered.text
    }
}

fn template_part(template: &serde_json::Map<String, Value>, part: &str) -> Result<String, EngineError> {
    template
        .get(part)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            EngineError::validation(
                EXECUTOR,
                format!("{}.{}", TEMPLATE_FIELD, part),
                "expected a string",
            )
        })
}

#[async_trait]
impl NodeExecutor for EmailExecutor {
    fn kind(&self) -> NodeKind {
        NodeKind::Email
    }

    fn set_args(&mut self, args: ExecutionContext) {
        self.args = args;
    }

    /// Required fields end up in the message text, so they must be scalars.
    fn validate_and_parse(&mut self, required_fields: &[String]) -> Result<(), EngineError> {
        for field in required_fields {
            match require_present(EXECUTOR, &self.args, field)? {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {}
                _ => return Err(EngineError::validation(EXECUTOR, field.as_str(), "expected a scalar value")),
            }
        }

        let template = require_present(EXECUTOR, &self.args, TEMPLATE_FIELD)?
            .as_object()
            .ok_or_else(|| EngineError::validation(EXECUTOR, TEMPLATE_FIELD, "expected an object"))?;
        let subject = template_part(template, "subject")?;
        let body = template_part(template, "body")?;
        let to = require_str(EXECUTOR, &self.args, RECIPIENT_FIELD)?.to_string();

        self.inputs = Some(EmailInputs { to, subject, body });
        Ok(())
    }

    fn set_output_fields(&mut self, fields: Vec<String>) -> Result<(), EngineError> {
        self.output_field = Some(single_output_field(EXECUTOR, fields)?);
        Ok(())
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<NodeOutput, EngineError> {
        let (Some(inputs), Some(field)) = (&self.inputs, &self.output_field) else {
            return Err(not_prepared(EXECUTOR));
        };

        let subject = self.render(&inputs.subject);
        let body = self.render(&inputs.body);

        let delivery = cancellable(cancel, async {
            self.mailer
                .send(&inputs.to, &subject, &body)
                .await
                .map_err(|e| EngineError::integration("mail", e))
        })
        .await;

        let sent = match delivery {
            Ok(()) => true,
            Err(EngineError::Cancelled) => return Err(EngineError::Cancelled),
            Err(e) => {
                tracing::warn!("📧 Delivery to {} failed: {}", inputs.to, e);
                false
            }
        };

        let mut output = NodeOutput::new();
        output.insert(field.clone(), Value::Bool(sent));
        Ok(output)
    }
}
