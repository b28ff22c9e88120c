use actix_web::web;
use std::sync::Arc;

use crate::application::auth::{
  ActivateAccountUseCase, GetCurrentUserUseCase, LoginUserUseCase, LogoutUserUseCase,
  RefreshTokenUseCase, RegisterUserUseCase, ResendActivationUseCase,
};
use crate::domain::auth::services::AuthService;

use super::handlers::auth::{
  activate_handler, get_current_user_handler, login_handler, logout_handler,
  refresh_token_handler, register_handler, resend_activation_handler,
};
use super::handlers::health::{health_handler, metrics_handler};

/// Routes that must work for a client holding an expired or revoked access
/// token, so the authentication gate does not inspect their header
pub const PUBLIC_PATHS: &[&str] = &[
  "/auth/login",
  "/auth/register",
  "/auth/refresh-token",
  "/auth/activate",
  "/auth/resend-activation",
  "/health",
];

/// Use cases served under the auth scope
#[derive(Clone)]
pub struct AuthRouteDependencies {
  pub register_use_case: Arc<RegisterUserUseCase>,
  pub login_use_case: Arc<LoginUserUseCase>,
  pub refresh_use_case: Arc<RefreshTokenUseCase>,
  pub logout_use_case: Arc<LogoutUserUseCase>,
  pub activate_use_case: Arc<ActivateAccountUseCase>,
  pub resend_activation_use_case: Arc<ResendActivationUseCase>,
  pub get_user_use_case: Arc<GetCurrentUserUseCase>,
}

impl AuthRouteDependencies {
  /// Builds every auth use case over one shared service
  pub fn from_service(auth_service: Arc<AuthService>) -> Self {
    Self {
      register_use_case: Arc::new(RegisterUserUseCase::new(auth_service.clone())),
      login_use_case: Arc::new(LoginUserUseCase::new(auth_service.clone())),
      refresh_use_case: Arc::new(RefreshTokenUseCase::new(auth_service.clone())),
      logout_use_case: Arc::new(LogoutUserUseCase::new(auth_service.clone())),
      activate_use_case: Arc::new(ActivateAccountUseCase::new(auth_service.clone())),
      resend_activation_use_case: Arc::new(ResendActivationUseCase::new(auth_service.clone())),
      get_user_use_case: Arc::new(GetCurrentUserUseCase::new(auth_service)),
    }
  }
}

/// Configure authentication routes
///
/// Mounts all authentication endpoints under the provided scope
/// (e.g. `/auth`). The authentication gate is expected to wrap the app with
/// [`PUBLIC_PATHS`] exempted, so `/logout` and `/me` see the principal it
/// attached.
///
/// # Routes
///
/// - POST /login - Exchange credentials for an access/refresh token pair
/// - POST /register - Register a new account and mail its activation link
/// - POST /refresh-token - Exchange a refresh token for a new access token
/// - GET /activate?token= - Consume an activation link
/// - DELETE /logout - Revoke the presented access token
/// - POST /resend-activation - Re-issue the activation link
/// - GET /me - Current principal
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig, deps: AuthRouteDependencies) {
  cfg
    .app_data(web::Data::new(deps.register_use_case))
    .app_data(web::Data::new(deps.login_use_case))
    .app_data(web::Data::new(deps.refresh_use_case))
    .app_data(web::Data::new(deps.logout_use_case))
    .app_data(web::Data::new(deps.activate_use_case))
    .app_data(web::Data::new(deps.resend_activation_use_case))
    .app_data(web::Data::new(deps.get_user_use_case))
    .route("/login", web::post().to(login_handler))
    .route("/register", web::post().to(register_handler))
    .route("/refresh-token", web::post().to(refresh_token_handler))
    .route("/activate", web::get().to(activate_handler))
    .route("/logout", web::delete().to(logout_handler))
    .route("/resend-activation", web::post().to(resend_activation_handler))
    .route("/me", web::get().to(get_current_user_handler));
}

/// Liveness and Prometheus scrape endpoints
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_handler))
    .route("/metrics", web::get().to(metrics_handler));
}
