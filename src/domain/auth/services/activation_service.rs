use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::ActivationToken;
use crate::domain::auth::errors::ActivationError;
use crate::domain::auth::ports::{ActivationTokenRepository, Clock, TokenGenerator};

pub const DEFAULT_ACTIVATION_TTL_SECONDS: i64 = 86_400;

/// One-time activation links for newly registered accounts
pub struct ActivationTokenService {
  repository: Arc<dyn ActivationTokenRepository>,
  generator: Arc<dyn TokenGenerator>,
  clock: Arc<dyn Clock>,
  ttl: Duration,
}

impl ActivationTokenService {
  pub fn new(
    repository: Arc<dyn ActivationTokenRepository>,
    generator: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
  ) -> Self {
    Self {
      repository,
      generator,
      clock,
      ttl,
    }
  }

  /// Issues a fresh token for the user, superseding any outstanding one
  pub async fn issue(&self, user_id: Uuid) -> Result<String, ActivationError> {
    let value = self
      .generator
      .generate()
      .await
      .map_err(|e| ActivationError::Generation(e.to_string()))?;

    let token = ActivationToken::new(value, user_id, self.clock.now(), self.ttl);
    let stored = self.repository.issue(token).await?;

    tracing::debug!(
      user_id = %user_id,
      expires_at = %stored.expires_at,
      "Issued activation token"
    );

    Ok(stored.token_value)
  }

  /// Consumes a token and returns the user it was issued for.
  ///
  /// The caller is responsible for marking the account verified.
  pub async fn consume(&self, value: &str) -> Result<Uuid, ActivationError> {
    let token = self
      .repository
      .find_by_value(value)
      .await?
      .ok_or(ActivationError::NotFound)?;

    if token.is_expired_at(self.clock.now()) {
      return Err(ActivationError::Expired);
    }

    if token.consumed {
      return Err(ActivationError::AlreadyUsed);
    }

    // Lost the race against a concurrent consumer
    if !self.repository.mark_consumed(token.id).await? {
      return Err(ActivationError::AlreadyUsed);
    }

    tracing::info!(user_id = %token.user_id, "Activation token consumed");

    Ok(token.user_id)
  }
}
