use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::auth::entities::Principal;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for logging in a user
#[derive(Debug, Clone)]
pub struct LoginUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text)
  pub password: String,
}

/// Response after successful user login
#[derive(Debug, Clone)]
pub struct LoginUserResponse {
  pub principal: Principal,
  pub access_token: String,
  /// Access token expiration timestamp
  pub expires_at: DateTime<Utc>,
  pub refresh_token: String,
  pub refresh_expires_at: DateTime<Utc>,
}

/// Use case for logging in a user
pub struct LoginUserUseCase {
  auth_service: Arc<AuthService>,
}

impl LoginUserUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the user login use case
  ///
  /// # Errors
  /// Returns `AuthError::InvalidCredentials` for any email/password mismatch,
  /// including a syntactically invalid email
  pub async fn execute(&self, command: LoginUserCommand) -> Result<LoginUserResponse, AuthError> {
    let email = Email::new(command.email).map_err(|_| AuthError::InvalidCredentials)?;
    let password = Password::presented(command.password);

    let outcome = self.auth_service.login(email, password).await?;

    Ok(LoginUserResponse {
      principal: outcome.principal,
      access_token: outcome.access_token.token,
      expires_at: outcome.access_token.expires_at,
      refresh_token: outcome.refresh_token.token,
      refresh_expires_at: outcome.refresh_token.expires_at,
    })
  }
}
