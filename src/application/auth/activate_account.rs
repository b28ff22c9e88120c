use std::sync::Arc;

use crate::domain::auth::entities::Principal;
use crate::domain::auth::errors::{ActivationError, AuthError};
use crate::domain::auth::services::AuthService;

/// Command carrying the token from an activation link
#[derive(Debug, Clone)]
pub struct ActivateAccountCommand {
  pub token: String,
}

#[derive(Debug, Clone)]
pub struct ActivateAccountResponse {
  pub principal: Principal,
}

/// Use case for following an activation link
pub struct ActivateAccountUseCase {
  auth_service: Arc<AuthService>,
}

impl ActivateAccountUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  pub async fn execute(
    &self,
    command: ActivateAccountCommand,
  ) -> Result<ActivateAccountResponse, AuthError> {
    let token = command.token.trim();
    if token.is_empty() {
      return Err(ActivationError::NotFound.into());
    }

    let principal = self.auth_service.activate(token).await?;

    Ok(ActivateAccountResponse { principal })
  }
}
