/// Mail delivery that only logs the message.

use super::MailSender;
use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMailer;

#[async_trait]
impl MailSender for NoopMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(to, subject, body, "📧 noop: email sent");
        Ok(())
    }
}
