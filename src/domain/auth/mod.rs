pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{AccessClaims, ActivationToken, Principal, RevocationEntry, UserAccount};
pub use errors::{
  ActivationError, AuthError, CodecError, HashError, MailError, RepositoryError, RevocationError,
  TokenError,
};
pub use value_objects::{
  BearerToken, Email, Password, PasswordHash, Role, TokenFingerprint, TokenKind, ValueObjectError,
};
