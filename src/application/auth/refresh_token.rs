use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::auth::entities::Principal;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Command for exchanging a refresh token
#[derive(Debug, Clone)]
pub struct RefreshTokenCommand {
  pub refresh_token: String,
}

/// Response after a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshTokenResponse {
  pub principal: Principal,
  pub access_token: String,
  pub expires_at: DateTime<Utc>,
  /// Replacement refresh token, only when rotation is enabled
  pub refresh_token: Option<String>,
  pub refresh_expires_at: Option<DateTime<Utc>>,
}

/// Use case for minting a new access token from a refresh token
pub struct RefreshTokenUseCase {
  auth_service: Arc<AuthService>,
}

impl RefreshTokenUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  pub async fn execute(
    &self,
    command: RefreshTokenCommand,
  ) -> Result<RefreshTokenResponse, AuthError> {
    let outcome = self.auth_service.refresh(&command.refresh_token).await?;

    let (refresh_token, refresh_expires_at) = match outcome.refresh_token {
      Some(issued) => (Some(issued.token), Some(issued.expires_at)),
      None => (None, None),
    };

    Ok(RefreshTokenResponse {
      principal: outcome.principal,
      access_token: outcome.access_token.token,
      expires_at: outcome.access_token.expires_at,
      refresh_token,
      refresh_expires_at,
    })
  }
}
