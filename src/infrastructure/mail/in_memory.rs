use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::auth::errors::MailError;
use crate::domain::auth::ports::Mailer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
  pub to: String,
  pub subject: String,
  pub body: String,
}

/// Records mail in memory so tests can read activation links back
#[derive(Debug, Default)]
pub struct InMemoryMailer {
  outbox: Mutex<Vec<SentMail>>,
}

impl InMemoryMailer {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn sent(&self) -> Vec<SentMail> {
    self.outbox.lock().await.clone()
  }

  pub async fn last(&self) -> Option<SentMail> {
    self.outbox.lock().await.last().cloned()
  }
}

#[async_trait]
impl Mailer for InMemoryMailer {
  async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
    self.outbox.lock().await.push(SentMail {
      to: to.to_string(),
      subject: subject.to_string(),
      body: body.to_string(),
    });
    Ok(())
  }
}
