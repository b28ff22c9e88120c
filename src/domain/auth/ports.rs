use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{AccessClaims, ActivationToken, UserAccount};
use super::errors::{CodecError, HashError, MailError, RepositoryError, RevocationError};
use super::value_objects::{Email, Password, PasswordHash, ValueObjectError};

/// Directory of user accounts, owned outside the auth core
#[async_trait]
pub trait UserDirectory: Send + Sync {
  /// Finds an account by its normalized email
  async fn find_by_email(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError>;

  /// Finds an account by its unique identifier
  async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, RepositoryError>;

  /// Checks whether an account is registered under this email
  async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError>;

  /// Inserts or updates an account.
  ///
  /// Fails with `RepositoryError::DuplicateKey` when a different account
  /// already holds the email.
  async fn save(&self, account: UserAccount) -> Result<UserAccount, RepositoryError>;

  /// Sets `verified = true`. Returns whether the flag actually changed;
  /// fails with `RepositoryError::NotFound` if no such account exists.
  async fn mark_verified(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Outbound mail, fire-and-forget
#[async_trait]
pub trait Mailer: Send + Sync {
  async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Service trait for password hashing operations
#[async_trait]
pub trait PasswordHasher: Send + Sync {
  /// Hashes a plain text password
  async fn hash(&self, password: &Password) -> Result<PasswordHash, HashError>;

  /// Verifies a plain text password against a hashed password
  async fn verify(
    &self,
    password: &Password,
    hashed_password: &PasswordHash,
  ) -> Result<bool, HashError>;
}

/// Signs and verifies compact claims blobs.
///
/// Implementations are pure: the output depends only on the input and the
/// signing key. `decode` checks structure, algorithm and signature only;
/// expiry and revocation belong to the token service.
pub trait TokenCodec: Send + Sync {
  fn encode(&self, claims: &AccessClaims) -> Result<String, CodecError>;

  fn decode(&self, token: &str) -> Result<AccessClaims, CodecError>;
}

/// Tokens invalidated before their natural expiry.
///
/// A completed `revoke` must be observed by every later `is_revoked` call
/// for the same token.
#[async_trait]
pub trait RevocationStore: Send + Sync {
  /// Marks the token as revoked. Revoking twice is a no-op.
  async fn revoke(&self, token: &str) -> Result<(), RevocationError>;

  async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError>;

  /// Drops entries whose token can no longer be valid. Returns how many were removed.
  async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, RevocationError>;
}

/// Persistence for activation tokens
#[async_trait]
pub trait ActivationTokenRepository: Send + Sync {
  /// Stores a fresh token, marking every outstanding token of the same user
  /// as consumed in the same atomic step.
  async fn issue(&self, token: ActivationToken) -> Result<ActivationToken, RepositoryError>;

  async fn find_by_value(&self, value: &str) -> Result<Option<ActivationToken>, RepositoryError>;

  /// Compare-and-set `consumed: false -> true`. Returns false if the token
  /// was already consumed.
  async fn mark_consumed(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Service trait for secure random token generation
#[async_trait]
pub trait TokenGenerator: Send + Sync {
  /// Generates an unguessable, URL-safe token
  async fn generate(&self) -> Result<String, ValueObjectError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}
