use std::sync::Arc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::BearerToken;

/// Use case for logging out a user
pub struct LogoutUserUseCase {
  auth_service: Arc<AuthService>,
}

impl LogoutUserUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Revokes the bearer token the request was authenticated with
  pub async fn execute(&self, token: &BearerToken) -> Result<(), AuthError> {
    self.auth_service.logout(token.as_str()).await
  }
}
