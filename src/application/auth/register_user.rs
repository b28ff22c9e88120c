use std::sync::Arc;

use crate::domain::auth::entities::Principal;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text, will be hashed)
  pub password: String,
  /// User's full name
  pub full_name: String,
}

/// Response after successful user registration
#[derive(Debug, Clone)]
pub struct RegisterUserResponse {
  /// The new, not yet verified account
  pub principal: Principal,
}

/// Use case for registering a new user
pub struct RegisterUserUseCase {
  auth_service: Arc<AuthService>,
}

impl RegisterUserUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Registers the account and mails its activation link
  ///
  /// # Errors
  /// Returns `AuthError` if registration fails (e.g., email already exists, validation errors)
  pub async fn execute(
    &self,
    command: RegisterUserCommand,
  ) -> Result<RegisterUserResponse, AuthError> {
    let email = Email::new(command.email)?;
    let password = Password::new(command.password)?;

    let account = self
      .auth_service
      .register(email, password, command.full_name.trim().to_string())
      .await?;

    Ok(RegisterUserResponse {
      principal: account.principal(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::harness;
  use crate::domain::auth::services::TokenServiceConfig;
  use crate::domain::auth::value_objects::{Role, ValueObjectError};

  #[tokio::test]
  async fn test_register_returns_unverified_user() {
    let h = harness(TokenServiceConfig::default());
    let use_case = RegisterUserUseCase::new(h.auth_service.clone());

    let response = use_case
      .execute(RegisterUserCommand {
        email: "New.User@Example.com".to_string(),
        password: "long enough password".to_string(),
        full_name: "  New User ".to_string(),
      })
      .await
      .unwrap();

    assert_eq!(response.principal.email, "new.user@example.com");
    assert_eq!(response.principal.role, Role::User);
    assert!(!response.principal.verified);
    assert_eq!(h.mailer.sent().await.len(), 1);
  }

  #[tokio::test]
  async fn test_register_rejects_short_password() {
    let h = harness(TokenServiceConfig::default());
    let use_case = RegisterUserUseCase::new(h.auth_service.clone());

    let result = use_case
      .execute(RegisterUserCommand {
        email: "user@example.com".to_string(),
        password: "short".to_string(),
        full_name: "User".to_string(),
      })
      .await;

    assert!(matches!(
      result,
      Err(AuthError::ValueObject(ValueObjectError::PasswordTooShort))
    ));
    assert!(h.mailer.sent().await.is_empty());
  }
}
