use thiserror::Error;

use super::value_objects::{TokenKind, ValueObjectError};

/// Main authentication error type
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Invalid credentials provided")]
  InvalidCredentials,

  #[error("Email already exists")]
  EmailAlreadyExists,

  #[error("User not found")]
  UserNotFound,

  #[error("Account is disabled")]
  AccountDisabled,

  #[error("Account has not been activated")]
  AccountNotActivated,

  #[error("Token error: {0}")]
  Token(#[from] TokenError),

  #[error("Activation error: {0}")]
  Activation(#[from] ActivationError),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),

  #[error("Hash error: {0}")]
  Hash(#[from] HashError),

  #[error("Value object error: {0}")]
  ValueObject(#[from] ValueObjectError),
}

/// Reasons a bearer token is refused or cannot be minted.
///
/// The distinctions are for logs and metrics; the HTTP boundary collapses all
/// validation failures into one unauthorized response.
#[derive(Debug, Error)]
pub enum TokenError {
  #[error("Token is malformed: {0}")]
  Malformed(String),

  #[error("Token signature is invalid")]
  SignatureInvalid,

  #[error("Token has expired")]
  Expired,

  #[error("Token has been revoked")]
  Revoked,

  #[error("Expected {expected} token, got {actual} token")]
  KindMismatch {
    expected: TokenKind,
    actual: TokenKind,
  },

  #[error("Principal not found")]
  PrincipalNotFound,

  #[error("Principal lookup failed: {0}")]
  PrincipalLookupFailed(String),

  #[error("Account is disabled")]
  AccountDisabled,

  #[error("Revocation store failure: {0}")]
  Revocation(#[from] RevocationError),

  #[error("Token encoding failed: {0}")]
  Encoding(String),

  #[error("Invalid token lifetime: {0}")]
  InvalidLifetime(String),
}

impl TokenError {
  /// Stable label for logs and metrics
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Malformed(_) => "malformed",
      Self::SignatureInvalid => "signature_invalid",
      Self::Expired => "expired",
      Self::Revoked => "revoked",
      Self::KindMismatch { .. } => "kind_mismatch",
      Self::PrincipalNotFound => "principal_not_found",
      Self::PrincipalLookupFailed(_) => "principal_lookup_failed",
      Self::AccountDisabled => "account_disabled",
      Self::Revocation(_) => "revocation_unavailable",
      Self::Encoding(_) => "encoding",
      Self::InvalidLifetime(_) => "invalid_lifetime",
    }
  }

  /// Whether this error describes a presented token being refused, as opposed
  /// to a failure to mint one
  pub fn is_rejection(&self) -> bool {
    !matches!(self, Self::Encoding(_) | Self::InvalidLifetime(_))
  }
}

/// Failures of the compact token codec
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
  #[error("Malformed token: {0}")]
  Malformed(String),

  #[error("Signature mismatch")]
  SignatureMismatch,

  #[error("Unsupported algorithm: {0}")]
  UnsupportedAlgorithm(String),

  #[error("Serialization failed: {0}")]
  Serialization(String),

  #[error("Signing key rejected: {0}")]
  WeakKey(String),
}

impl From<CodecError> for TokenError {
  fn from(error: CodecError) -> Self {
    match error {
      CodecError::Malformed(reason) => TokenError::Malformed(reason),
      CodecError::SignatureMismatch | CodecError::UnsupportedAlgorithm(_) => {
        TokenError::SignatureInvalid
      }
      CodecError::Serialization(reason) | CodecError::WeakKey(reason) => {
        TokenError::Encoding(reason)
      }
    }
  }
}

/// Activation-link failures, disclosed precisely to the client
#[derive(Debug, Error)]
pub enum ActivationError {
  #[error("Activation token not found")]
  NotFound,

  #[error("Activation token has expired")]
  Expired,

  #[error("Activation token has already been used")]
  AlreadyUsed,

  #[error("Activation token generation failed: {0}")]
  Generation(String),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}

/// Revocation store backend failures
#[derive(Debug, Error)]
pub enum RevocationError {
  #[error("Revocation backend error: {0}")]
  Backend(String),
}

impl From<redis::RedisError> for RevocationError {
  fn from(error: redis::RedisError) -> Self {
    RevocationError::Backend(error.to_string())
  }
}

/// Repository-related errors
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Database connection failed: {0}")]
  ConnectionFailed(String),

  #[error("Query execution failed: {0}")]
  QueryFailed(String),

  #[error("Record not found")]
  NotFound,

  #[error("Duplicate key violation: {0}")]
  DuplicateKey(String),

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Corrupt record: {0}")]
  CorruptRecord(String),
}

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum HashError {
  #[error("Failed to hash password: {0}")]
  HashingFailed(String),

  #[error("Failed to verify password: {0}")]
  VerificationFailed(String),
}

/// Outbound mail failures. Never surfaced to the client.
#[derive(Debug, Error)]
pub enum MailError {
  #[error("Invalid address: {0}")]
  InvalidAddress(String),

  #[error("Failed to build message: {0}")]
  Build(String),

  #[error("Transport error: {0}")]
  Transport(String),
}

// Automatic conversions from external error types

impl From<sqlx::Error> for RepositoryError {
  fn from(error: sqlx::Error) -> Self {
    match error {
      sqlx::Error::RowNotFound => RepositoryError::NotFound,
      sqlx::Error::Database(db_err) => {
        if db_err.is_unique_violation() {
          RepositoryError::DuplicateKey(db_err.message().to_string())
        } else {
          RepositoryError::DatabaseError(db_err.message().to_string())
        }
      }
      sqlx::Error::PoolTimedOut => RepositoryError::ConnectionFailed("Pool timed out".to_string()),
      sqlx::Error::PoolClosed => RepositoryError::ConnectionFailed("Pool closed".to_string()),
      _ => RepositoryError::QueryFailed(error.to_string()),
    }
  }
}

impl From<sqlx::Error> for AuthError {
  fn from(error: sqlx::Error) -> Self {
    AuthError::Repository(RepositoryError::from(error))
  }
}
