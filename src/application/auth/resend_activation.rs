use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::Email;

#[derive(Debug, Clone)]
pub struct ResendActivationCommand {
  pub email: String,
}

/// Use case for requesting a fresh activation link.
///
/// The outcome never reveals whether the email belongs to an account.
pub struct ResendActivationUseCase {
  auth_service: Arc<AuthService>,
}

impl ResendActivationUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  pub async fn execute(&self, command: ResendActivationCommand) -> Result<(), AuthError> {
    let Ok(email) = Email::new(command.email) else {
      return Ok(());
    };

    self.auth_service.resend_activation(email).await
  }
}
