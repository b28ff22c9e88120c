use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::entities::Principal;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Response containing current user information
#[derive(Debug, Clone)]
pub struct GetCurrentUserResponse {
  pub principal: Principal,
}

/// Use case for getting the current authenticated user
pub struct GetCurrentUserUseCase {
  auth_service: Arc<AuthService>,
}

impl GetCurrentUserUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Re-reads the account so the response reflects changes made after the
  /// token was validated
  pub async fn execute(&self, user_id: Uuid) -> Result<GetCurrentUserResponse, AuthError> {
    let principal = self.auth_service.current_user(user_id).await?;

    Ok(GetCurrentUserResponse { principal })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::harness;
  use crate::domain::auth::services::TokenServiceConfig;

  #[tokio::test]
  async fn test_unknown_user() {
    let h = harness(TokenServiceConfig::default());

    let result = GetCurrentUserUseCase::new(h.auth_service.clone())
      .execute(Uuid::new_v4())
      .await;

    assert!(matches!(result, Err(AuthError::UserNotFound)));
  }
}
