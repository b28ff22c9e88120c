use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::adapters::http::{
  dtos::{
    ActivateQuery, ActivationResponse, CurrentUserResponse, LoginRequest, RefreshTokenRequest,
    RegisterRequest, RegisterResponse, ResendActivationRequest, SuccessResponse,
    TOKEN_TYPE_BEARER, TokenResponse,
  },
  errors::ApiError,
  middleware::AuthenticatedPrincipal,
};
use crate::application::auth::{
  ActivateAccountCommand, ActivateAccountUseCase, GetCurrentUserUseCase, LoginUserCommand,
  LoginUserUseCase, LogoutUserUseCase, RefreshTokenCommand, RefreshTokenUseCase,
  RegisterUserCommand, RegisterUserUseCase, ResendActivationCommand, ResendActivationUseCase,
};
use crate::domain::auth::{
  errors::{AuthError, TokenError},
  value_objects::TokenKind,
};
use crate::infrastructure::metrics;

/// Handler for user registration
///
/// POST /auth/register
/// Body: RegisterRequest (JSON)
/// Response: RegisterResponse (JSON) with status 201
pub async fn register_handler(
  request: web::Json<RegisterRequest>,
  use_case: web::Data<Arc<RegisterUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let request = request.into_inner();
  let command = RegisterUserCommand {
    email: request.email,
    password: request.password,
    full_name: request.full_name,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Created().json(RegisterResponse {
    principal: response.principal.into(),
    message: "Registration successful. Check your email to activate your account.".to_string(),
  }))
}

/// Handler for user login
///
/// POST /auth/login
/// Body: LoginRequest (JSON)
/// Response: TokenResponse (JSON) with status 200
pub async fn login_handler(
  request: web::Json<LoginRequest>,
  use_case: web::Data<Arc<LoginUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let request = request.into_inner();
  let command = LoginUserCommand {
    email: request.email,
    password: request.password,
  };

  let response = use_case.execute(command).await?;
  metrics::record_token_issued(TokenKind::Access);
  metrics::record_token_issued(TokenKind::Refresh);

  Ok(HttpResponse::Ok().json(TokenResponse {
    access_token: response.access_token,
    refresh_token: Some(response.refresh_token),
    token_type: TOKEN_TYPE_BEARER.to_string(),
    expires_at: response.expires_at,
    refresh_expires_at: Some(response.refresh_expires_at),
    principal: response.principal.into(),
  }))
}

/// Handler for exchanging a refresh token
///
/// POST /auth/refresh-token
/// Body: RefreshTokenRequest (JSON)
/// Response: TokenResponse (JSON) with status 200
pub async fn refresh_token_handler(
  request: web::Json<RefreshTokenRequest>,
  use_case: web::Data<Arc<RefreshTokenUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let command = RefreshTokenCommand {
    refresh_token: request.into_inner().refresh_token,
  };

  let response = match use_case.execute(command).await {
    Ok(response) => response,
    Err(AuthError::Token(e)) => {
      if e.is_rejection() {
        metrics::record_validation_failure(&e);
        tracing::debug!(kind = e.kind(), "Refresh token rejected");
      }
      return Err(e.into());
    }
    Err(e) => return Err(e.into()),
  };

  metrics::record_token_issued(TokenKind::Access);
  if response.refresh_token.is_some() {
    metrics::record_token_issued(TokenKind::Refresh);
  }

  Ok(HttpResponse::Ok().json(TokenResponse {
    access_token: response.access_token,
    refresh_token: response.refresh_token,
    token_type: TOKEN_TYPE_BEARER.to_string(),
    expires_at: response.expires_at,
    refresh_expires_at: response.refresh_expires_at,
    principal: response.principal.into(),
  }))
}

/// Handler for the emailed activation link
///
/// GET /auth/activate?token=...
pub async fn activate_handler(
  query: web::Query<ActivateQuery>,
  use_case: web::Data<Arc<ActivateAccountUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let command = ActivateAccountCommand {
    token: query.into_inner().token,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(ActivationResponse {
    principal: response.principal.into(),
    message: "Account activated".to_string(),
  }))
}

/// Handler for user logout
///
/// DELETE /auth/logout
/// Headers: Authorization: Bearer <token>
/// Response: SuccessResponse (JSON) with status 200
pub async fn logout_handler(
  authenticated: AuthenticatedPrincipal,
  use_case: web::Data<Arc<LogoutUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  match use_case.execute(&authenticated.token).await {
    Ok(()) => metrics::record_token_revoked(),
    // The token was valid a moment ago; a store outage is ours, not the caller's
    Err(AuthError::Token(TokenError::Revocation(e))) => {
      return Err(ApiError::Internal(e.to_string()));
    }
    Err(e) => return Err(e.into()),
  }

  tracing::info!(user_id = %authenticated.principal.id, "User logged out");

  Ok(HttpResponse::Ok().json(SuccessResponse {
    message: "Successfully logged out".to_string(),
  }))
}

/// Handler for re-sending the activation email
///
/// POST /auth/resend-activation
/// Always 202, whether or not the address belongs to an account.
pub async fn resend_activation_handler(
  request: web::Json<ResendActivationRequest>,
  use_case: web::Data<Arc<ResendActivationUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let command = ResendActivationCommand {
    email: request.into_inner().email,
  };

  use_case.execute(command).await?;

  Ok(HttpResponse::Accepted().json(SuccessResponse {
    message: "If the account exists and is not yet activated, a new link has been sent"
      .to_string(),
  }))
}

/// Handler for getting current user information
///
/// GET /auth/me
/// Headers: Authorization: Bearer <token>
/// Response: CurrentUserResponse (JSON) with status 200
pub async fn get_current_user_handler(
  authenticated: AuthenticatedPrincipal,
  use_case: web::Data<Arc<GetCurrentUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case.execute(authenticated.principal.id).await?;

  Ok(HttpResponse::Ok().json(CurrentUserResponse {
    principal: response.principal.into(),
  }))
}
