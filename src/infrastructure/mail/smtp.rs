use async_trait::async_trait;
use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};

use crate::domain::auth::errors::MailError;
use crate::domain::auth::ports::Mailer;
use crate::infrastructure::config::MailConfig;

/// Sends mail through an SMTP relay
pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from: Mailbox,
}

impl SmtpMailer {
  pub fn new(config: &MailConfig) -> Result<Self, MailError> {
    let from: Mailbox = config
      .from_address
      .parse()
      .map_err(|e| MailError::InvalidAddress(format!("{}: {}", config.from_address, e)))?;

    let credentials = match (&config.smtp_username, &config.smtp_password) {
      (Some(username), Some(password)) => {
        Some(Credentials::new(username.clone(), password.clone()))
      }
      _ => None,
    };

    let transport = if config.use_tls {
      let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        .map_err(|e| MailError::Transport(format!("Failed to create SMTP relay: {}", e)))?
        .port(config.smtp_port);
      if let Some(credentials) = credentials {
        builder = builder.credentials(credentials);
      }
      builder.build()
    } else {
      // Plain SMTP, for local catch-all servers
      let mut builder =
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
          .port(config.smtp_port);
      if let Some(credentials) = credentials {
        builder = builder.credentials(credentials);
      }
      builder.build()
    };

    Ok(Self { transport, from })
  }
}

#[async_trait]
impl Mailer for SmtpMailer {
  async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
    let to: Mailbox = to
      .parse()
      .map_err(|e| MailError::InvalidAddress(format!("{}: {}", to, e)))?;

    let message = Message::builder()
      .from(self.from.clone())
      .to(to)
      .subject(subject)
      .header(ContentType::TEXT_PLAIN)
      .body(body.to_string())
      .map_err(|e| MailError::Build(e.to_string()))?;

    self
      .transport
      .send(message)
      .await
      .map_err(|e| MailError::Transport(e.to_string()))?;

    tracing::debug!(subject, "Mail sent");
    Ok(())
  }
}
