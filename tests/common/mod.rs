#![allow(dead_code)]

use actix_web::{
  App, Error,
  body::MessageBody,
  dev::{ServiceFactory, ServiceRequest, ServiceResponse},
  web,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use taskflow::{
  adapters::http::{
    AuthMiddleware, AuthRouteDependencies, PUBLIC_PATHS, RequestIdMiddleware,
    configure_auth_routes, configure_health_routes,
  },
  domain::auth::services::{
    ActivationTokenService, AuthService, AuthServiceConfig, TokenService, TokenServiceConfig,
  },
  infrastructure::{
    clock::ManualClock,
    mail::InMemoryMailer,
    persistence::memory::{InMemoryActivationTokenRepository, InMemoryUserDirectory},
    revocation::InMemoryRevocationStore,
    security::{Argon2PasswordHasher, HmacTokenCodec, SecureTokenGenerator},
  },
};

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestContext {
  pub token_service: Arc<TokenService>,
  pub auth_service: Arc<AuthService>,
  pub directory: Arc<InMemoryUserDirectory>,
  pub mailer: Arc<InMemoryMailer>,
  pub clock: Arc<ManualClock>,
}

pub fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn context() -> TestContext {
  context_with(TokenServiceConfig::default(), AuthServiceConfig::default())
}

pub fn context_with(token_config: TokenServiceConfig, auth_config: AuthServiceConfig) -> TestContext {
  let clock = Arc::new(ManualClock::new(t0()));
  let directory = Arc::new(InMemoryUserDirectory::new());
  let mailer = Arc::new(InMemoryMailer::new());

  let token_service = Arc::new(TokenService::new(
    Arc::new(HmacTokenCodec::new(b"integration-test-secret-0123456789").unwrap()),
    Arc::new(InMemoryRevocationStore::new(
      clock.clone(),
      token_config.max_token_lifetime(),
    )),
    directory.clone(),
    clock.clone(),
    token_config,
  ));
  let activation_service = Arc::new(ActivationTokenService::new(
    Arc::new(InMemoryActivationTokenRepository::new()),
    Arc::new(SecureTokenGenerator::new()),
    clock.clone(),
    Duration::hours(24),
  ));
  let auth_service = Arc::new(AuthService::new(
    directory.clone(),
    Arc::new(Argon2PasswordHasher::new().unwrap()),
    mailer.clone(),
    token_service.clone(),
    activation_service,
    auth_config,
  ));

  TestContext {
    token_service,
    auth_service,
    directory,
    mailer,
    clock,
  }
}

/// The production app minus the rate limiter, which needs a peer address
pub fn app(
  ctx: &TestContext,
) -> App<
  impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse<impl MessageBody + use<>>,
    Error = Error,
    InitError = (),
  > + use<>,
> {
  let deps = AuthRouteDependencies::from_service(ctx.auth_service.clone());

  App::new()
    .wrap(AuthMiddleware::new(ctx.token_service.clone()).with_public_paths(PUBLIC_PATHS))
    .wrap(RequestIdMiddleware::new())
    .service(web::scope("/auth").configure(|cfg| configure_auth_routes(cfg, deps)))
    .configure(configure_health_routes)
}

/// Pulls the activation token out of the most recent mail
pub async fn last_activation_token(mailer: &InMemoryMailer) -> String {
  let mail = mailer.last().await.expect("an activation mail was sent");
  mail
    .body
    .split("token=")
    .nth(1)
    .and_then(|rest| rest.split_whitespace().next())
    .unwrap()
    .to_string()
}

pub fn register_request(email: &str) -> actix_web::test::TestRequest {
  actix_web::test::TestRequest::post()
    .uri("/auth/register")
    .set_json(serde_json::json!({
      "email": email,
      "password": PASSWORD,
      "fullName": "Test User",
    }))
}

pub fn login_request(email: &str, password: &str) -> actix_web::test::TestRequest {
  actix_web::test::TestRequest::post()
    .uri("/auth/login")
    .set_json(serde_json::json!({ "email": email, "password": password }))
}

pub fn me_request(token: &str) -> actix_web::test::TestRequest {
  actix_web::test::TestRequest::get()
    .uri("/auth/me")
    .insert_header(("Authorization", format!("Bearer {}", token)))
}
