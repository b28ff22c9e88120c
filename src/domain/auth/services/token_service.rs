use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::domain::auth::entities::{AccessClaims, Principal};
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::ports::{Clock, RevocationStore, TokenCodec, UserDirectory};
use crate::domain::auth::value_objects::{Email, TokenFingerprint, TokenKind};

pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;
/// Default refresh lifetime as a multiple of the access lifetime
pub const REFRESH_TTL_MULTIPLIER: i32 = 24;
/// Refresh tokens must live at least this many times longer than access tokens
pub const MIN_REFRESH_TO_ACCESS_RATIO: i32 = 2;
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 2_000;

/// Lifetimes and policies for bearer tokens
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
  pub access_ttl: Duration,
  pub refresh_ttl: Duration,
  /// When set, `refresh` revokes the presented refresh token and returns a new one
  pub rotate_refresh_tokens: bool,
  /// Upper bound on the user directory lookup inside `validate`
  pub lookup_timeout: std::time::Duration,
}

impl TokenServiceConfig {
  /// Builds a config from second counts; the refresh lifetime defaults to
  /// `REFRESH_TTL_MULTIPLIER` access lifetimes.
  ///
  /// # Errors
  /// `TokenError::InvalidLifetime` if either lifetime is not positive or the
  /// refresh lifetime is shorter than `MIN_REFRESH_TO_ACCESS_RATIO` access
  /// lifetimes.
  pub fn from_seconds(
    access_ttl_seconds: i64,
    refresh_ttl_seconds: Option<i64>,
  ) -> Result<Self, TokenError> {
    let access_ttl = Duration::seconds(access_ttl_seconds);
    let refresh_ttl = refresh_ttl_seconds
      .map(Duration::seconds)
      .unwrap_or(access_ttl * REFRESH_TTL_MULTIPLIER);

    let config = Self {
      access_ttl,
      refresh_ttl,
      rotate_refresh_tokens: false,
      lookup_timeout: std::time::Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
    };
    config.validate()?;
    Ok(config)
  }

  pub fn with_rotation(mut self, rotate_refresh_tokens: bool) -> Self {
    self.rotate_refresh_tokens = rotate_refresh_tokens;
    self
  }

  pub fn with_lookup_timeout(mut self, lookup_timeout: std::time::Duration) -> Self {
    self.lookup_timeout = lookup_timeout;
    self
  }

  /// Checks the lifetime invariants
  pub fn validate(&self) -> Result<(), TokenError> {
    if self.access_ttl <= Duration::zero() {
      return Err(TokenError::InvalidLifetime(
        "access token lifetime must be positive".to_string(),
      ));
    }

    if self.refresh_ttl < self.access_ttl * MIN_REFRESH_TO_ACCESS_RATIO {
      return Err(TokenError::InvalidLifetime(format!(
        "refresh token lifetime must be at least {} times the access token lifetime",
        MIN_REFRESH_TO_ACCESS_RATIO
      )));
    }

    Ok(())
  }

  /// Longest lifetime any issued token can have
  pub fn max_token_lifetime(&self) -> Duration {
    self.refresh_ttl.max(self.access_ttl)
  }
}

impl Default for TokenServiceConfig {
  fn default() -> Self {
    let access_ttl = Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECONDS);
    Self {
      access_ttl,
      refresh_ttl: access_ttl * REFRESH_TTL_MULTIPLIER,
      rotate_refresh_tokens: false,
      lookup_timeout: std::time::Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
    }
  }
}

/// A freshly minted token together with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub token: String,
  pub kind: TokenKind,
  pub issued_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

/// Result of exchanging a refresh token
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
  pub access_token: IssuedToken,
  /// Only present when refresh-token rotation is enabled
  pub refresh_token: Option<IssuedToken>,
  pub principal: Principal,
}

/// Issues, validates, refreshes and revokes bearer tokens
pub struct TokenService {
  codec: Arc<dyn TokenCodec>,
  revocations: Arc<dyn RevocationStore>,
  directory: Arc<dyn UserDirectory>,
  clock: Arc<dyn Clock>,
  config: TokenServiceConfig,
}

impl TokenService {
  pub fn new(
    codec: Arc<dyn TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
  ) -> Self {
    Self {
      codec,
      revocations,
      directory,
      clock,
      config,
    }
  }

  pub fn config(&self) -> &TokenServiceConfig {
    &self.config
  }

  pub fn issue_access_token(&self, email: &str) -> Result<IssuedToken, TokenError> {
    self.issue(email, TokenKind::Access, self.config.access_ttl)
  }

  pub fn issue_refresh_token(&self, email: &str) -> Result<IssuedToken, TokenError> {
    self.issue(email, TokenKind::Refresh, self.config.refresh_ttl)
  }

  fn issue(&self, email: &str, kind: TokenKind, ttl: Duration) -> Result<IssuedToken, TokenError> {
    let claims = AccessClaims::new(email, kind, self.clock.now(), ttl)?;
    let token = self.codec.encode(&claims)?;

    tracing::debug!(
      jti = %claims.jti,
      kind = %kind,
      expires_at = %claims.expires_at,
      "Issued token"
    );

    Ok(IssuedToken {
      token,
      kind,
      issued_at: claims.issued_at,
      expires_at: claims.expires_at,
    })
  }

  /// Validates a presented token and resolves the principal it is bound to.
  ///
  /// Checks run in a fixed order: revocation, signature, expiry, kind,
  /// principal lookup. A revoked token is refused before its signature is
  /// looked at.
  ///
  /// # Errors
  /// `Revoked`, `Malformed`, `SignatureInvalid`, `Expired`, `KindMismatch`,
  /// `PrincipalNotFound`, `PrincipalLookupFailed`, `AccountDisabled`, or
  /// `Revocation` when the revocation store cannot answer (fails closed).
  pub async fn validate(&self, token: &str, expected: TokenKind) -> Result<Principal, TokenError> {
    let result = self.validate_inner(token, expected).await;

    if let Err(e) = &result {
      tracing::debug!(
        fingerprint = %TokenFingerprint::of(token).short(),
        expected = %expected,
        kind = e.kind(),
        "Token rejected"
      );
    }

    result
  }

  async fn validate_inner(
    &self,
    token: &str,
    expected: TokenKind,
  ) -> Result<Principal, TokenError> {
    if self.revocations.is_revoked(token).await? {
      return Err(TokenError::Revoked);
    }

    let claims = self.codec.decode(token)?;

    if claims.is_expired_at(self.clock.now()) {
      return Err(TokenError::Expired);
    }

    if claims.kind != expected {
      return Err(TokenError::KindMismatch {
        expected,
        actual: claims.kind,
      });
    }

    let email = Email::new(claims.subject)
      .map_err(|e| TokenError::Malformed(format!("subject: {}", e)))?;

    let lookup = tokio::time::timeout(
      self.config.lookup_timeout,
      self.directory.find_by_email(&email),
    )
    .await;

    let account = match lookup {
      Err(_) => {
        tracing::warn!(
          timeout_ms = self.config.lookup_timeout.as_millis() as u64,
          "Principal lookup timed out"
        );
        return Err(TokenError::PrincipalLookupFailed(
          "directory lookup timed out".to_string(),
        ));
      }
      Ok(Err(e)) => {
        tracing::error!("Principal lookup failed: {}", e);
        return Err(TokenError::PrincipalLookupFailed(e.to_string()));
      }
      Ok(Ok(None)) => return Err(TokenError::PrincipalNotFound),
      Ok(Ok(Some(account))) => account,
    };

    let principal = account.principal();
    if !principal.enabled {
      return Err(TokenError::AccountDisabled);
    }

    Ok(principal)
  }

  /// Exchanges a refresh token for a new access token.
  ///
  /// The refresh token stays valid unless rotation is enabled, in which case
  /// it is revoked and a replacement is returned.
  pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, TokenError> {
    let principal = self.validate(refresh_token, TokenKind::Refresh).await?;
    let access_token = self.issue_access_token(&principal.email)?;

    let refresh_token = if self.config.rotate_refresh_tokens {
      self.revoke(refresh_token).await?;
      Some(self.issue_refresh_token(&principal.email)?)
    } else {
      None
    };

    Ok(RefreshOutcome {
      access_token,
      refresh_token,
      principal,
    })
  }

  /// Revokes a token. Idempotent.
  pub async fn revoke(&self, token: &str) -> Result<(), TokenError> {
    self.revocations.revoke(token).await?;

    tracing::info!(
      fingerprint = %TokenFingerprint::of(token).short(),
      "Token revoked"
    );

    Ok(())
  }
}
