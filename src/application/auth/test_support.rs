use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::auth::services::{
  ActivationTokenService, AuthService, AuthServiceConfig, TokenService, TokenServiceConfig,
};
use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::mail::InMemoryMailer;
use crate::infrastructure::persistence::memory::{
  InMemoryActivationTokenRepository, InMemoryUserDirectory,
};
use crate::infrastructure::revocation::InMemoryRevocationStore;
use crate::infrastructure::security::{Argon2PasswordHasher, HmacTokenCodec, SecureTokenGenerator};

pub(crate) struct Harness {
  pub auth_service: Arc<AuthService>,
  pub mailer: Arc<InMemoryMailer>,
  pub clock: Arc<ManualClock>,
}

pub(crate) fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub(crate) fn harness(token_config: TokenServiceConfig) -> Harness {
  let clock = Arc::new(ManualClock::new(t0()));
  let directory = Arc::new(InMemoryUserDirectory::new());
  let mailer = Arc::new(InMemoryMailer::new());

  let token_service = Arc::new(TokenService::new(
    Arc::new(HmacTokenCodec::new(b"use-case-test-secret-at-least-32-bytes").unwrap()),
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
    directory,
    Arc::new(Argon2PasswordHasher::new().unwrap()),
    mailer.clone(),
    token_service,
    activation_service,
    AuthServiceConfig::default(),
  ));

  Harness {
    auth_service,
    mailer,
    clock,
  }
}

/// Pulls the activation token out of the most recent mail
pub(crate) async fn last_activation_token(mailer: &InMemoryMailer) -> String {
  let mail = mailer.last().await.expect("an activation mail was sent");
  mail
    .body
    .split("token=")
    .nth(1)
    .and_then(|rest| rest.split_whitespace().next())
    .unwrap()
    .to_string()
}
