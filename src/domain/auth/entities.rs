use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::TokenError;
use super::value_objects::{Role, TokenFingerprint, TokenKind};

/// Identity resolved from a validated token.
///
/// An immutable snapshot taken when the token is validated; the directory
/// owns the underlying record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id: Uuid,
  pub email: String,
  pub role: Role,
  pub verified: bool,
  pub enabled: bool,
}

impl Principal {
  /// Whether the principal's role grants the capabilities of `required`
  pub fn has_role(&self, required: Role) -> bool {
    self.role.satisfies(required)
  }
}

/// Stored user record as held by the user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
  pub id: Uuid,
  /// Normalized (lowercase) email, unique
  pub email: String,
  /// Argon2id PHC string
  pub password_hash: String,
  pub full_name: String,
  pub role: Role,
  pub verified: bool,
  pub enabled: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl UserAccount {
  /// Creates a new, enabled but unverified account with the `User` role
  pub fn new(email: String, password_hash: String, full_name: String) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email,
      password_hash,
      full_name,
      role: Role::User,
      verified: false,
      enabled: true,
      created_at: now,
      updated_at: now,
    }
  }

  /// Creates an account from database fields (for reconstruction)
  #[allow(clippy::too_many_arguments)]
  pub fn from_db(
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    role: Role,
    verified: bool,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      email,
      password_hash,
      full_name,
      role,
      verified,
      enabled,
      created_at,
      updated_at,
    }
  }

  /// Projects the account onto the principal snapshot handed to request handlers
  pub fn principal(&self) -> Principal {
    Principal {
      id: self.id,
      email: self.email.clone(),
      role: self.role,
      verified: self.verified,
      enabled: self.enabled,
    }
  }

  /// Flips `verified` to true. Returns false if it already was.
  pub fn mark_verified(&mut self) -> bool {
    if self.verified {
      return false;
    }
    self.verified = true;
    self.updated_at = Utc::now();
    true
  }
}

/// Signed claims carried by access and refresh tokens.
///
/// Timestamps are whole seconds so that a decoded token compares equal to the
/// claims it was encoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
  /// Unique token id; keeps tokens minted in the same second distinct
  pub jti: Uuid,
  /// Subject email
  #[serde(rename = "sub")]
  pub subject: String,
  #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
  pub issued_at: DateTime<Utc>,
  #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
  pub expires_at: DateTime<Utc>,
  pub kind: TokenKind,
}

impl AccessClaims {
  /// Builds claims valid for `ttl` from `issued_at` (truncated to the second).
  ///
  /// # Errors
  /// Returns `TokenError::InvalidLifetime` when `ttl` is not positive, since
  /// `expires_at` must be strictly after `issued_at`.
  pub fn new(
    subject: impl Into<String>,
    kind: TokenKind,
    issued_at: DateTime<Utc>,
    ttl: Duration,
  ) -> Result<Self, TokenError> {
    if ttl <= Duration::zero() {
      return Err(TokenError::InvalidLifetime(format!(
        "{} token lifetime must be positive",
        kind
      )));
    }

    let issued_at = truncate_to_seconds(issued_at);
    let expires_at = issued_at
      .checked_add_signed(ttl)
      .ok_or_else(|| TokenError::InvalidLifetime("token lifetime overflows".to_string()))?;

    Ok(Self {
      jti: Uuid::new_v4(),
      subject: subject.into(),
      issued_at,
      expires_at,
      kind,
    })
  }

  /// A token is valid only while `now < expires_at`
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now >= self.expires_at
  }
}

fn truncate_to_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
  DateTime::from_timestamp(instant.timestamp(), 0).unwrap_or(instant)
}

/// A token invalidated before its natural expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationEntry {
  pub fingerprint: TokenFingerprint,
  pub revoked_at: DateTime<Utc>,
}

impl RevocationEntry {
  pub fn new(fingerprint: TokenFingerprint, revoked_at: DateTime<Utc>) -> Self {
    Self {
      fingerprint,
      revoked_at,
    }
  }

  /// Once the longest possible token lifetime has passed since revocation the
  /// token is expired anyway, so the entry no longer carries information.
  pub fn is_stale(&self, now: DateTime<Utc>, max_token_lifetime: Duration) -> bool {
    self.revoked_at + max_token_lifetime < now
  }
}

/// One-time capability binding an unverified account to an activation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationToken {
  pub id: Uuid,
  pub token_value: String,
  pub user_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub consumed: bool,
}

impl ActivationToken {
  pub fn new(token_value: String, user_id: Uuid, created_at: DateTime<Utc>, ttl: Duration) -> Self {
    Self {
      id: Uuid::new_v4(),
      token_value,
      user_id,
      created_at,
      expires_at: created_at + ttl,
      consumed: false,
    }
  }

  /// Activation links stay usable up to and including `expires_at`
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }
}
