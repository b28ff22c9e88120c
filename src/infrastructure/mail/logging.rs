use async_trait::async_trait;

use crate::domain::auth::errors::MailError;
use crate::domain::auth::ports::Mailer;

/// Writes outgoing mail to the log instead of sending it.
/// Used when `mail.enabled` is false.
#[derive(Debug, Default)]
pub struct LoggingMailer;

impl LoggingMailer {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl Mailer for LoggingMailer {
  async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
    tracing::info!(to, subject, "Mail delivery disabled, logging message\n{}", body);
    Ok(())
  }
}
