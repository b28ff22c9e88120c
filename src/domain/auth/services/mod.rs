pub mod activation_service;
pub mod auth_service;
pub mod token_service;

pub use activation_service::{ActivationTokenService, DEFAULT_ACTIVATION_TTL_SECONDS};
pub use auth_service::{ACTIVATION_MAIL_SUBJECT, AuthService, AuthServiceConfig, LoginOutcome};
pub use token_service::{
  DEFAULT_ACCESS_TOKEN_TTL_SECONDS, IssuedToken, RefreshOutcome, TokenService, TokenServiceConfig,
};
