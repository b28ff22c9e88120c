use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::auth::errors::{ActivationError, AuthError, RepositoryError, TokenError};

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Authentication or authorization error (401, 403, 404, 409)
  Auth(AuthErrorKind),

  /// Activation link failure (400 Bad Request, disclosed precisely)
  Activation(ActivationErrorKind),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

/// Authentication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthErrorKind {
  /// Any refused bearer token (401). Deliberately carries no reason.
  Unauthorized,

  /// Unknown email or wrong password (401)
  InvalidCredentials,

  /// Login against a disabled account (401)
  AccountDisabled,

  /// Login before the email was verified (401)
  AccountNotActivated,

  /// Authenticated but lacking the required role (403)
  Forbidden,

  /// Email already exists (409)
  EmailAlreadyExists,

  /// User not found (404)
  UserNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivationErrorKind {
  NotFound,
  Expired,
  AlreadyUsed,
}

impl AuthErrorKind {
  fn code_and_message(self) -> (&'static str, &'static str) {
    match self {
      Self::Unauthorized => ("unauthorized", "Authentication required"),
      Self::InvalidCredentials => ("invalid_credentials", "Invalid email or password"),
      Self::AccountDisabled => ("account_disabled", "This account has been disabled"),
      Self::AccountNotActivated => (
        "account_not_activated",
        "Please activate your account using the link sent by email",
      ),
      Self::Forbidden => ("forbidden", "Insufficient permissions"),
      Self::EmailAlreadyExists => (
        "email_already_exists",
        "An account with this email already exists",
      ),
      Self::UserNotFound => ("user_not_found", "User not found"),
    }
  }
}

impl ActivationErrorKind {
  fn code_and_message(self) -> (&'static str, &'static str) {
    match self {
      Self::NotFound => (
        "activation_token_not_found",
        "Activation link is invalid",
      ),
      Self::Expired => (
        "activation_token_expired",
        "Activation link has expired, please request a new one",
      ),
      Self::AlreadyUsed => (
        "activation_token_already_used",
        "Activation link has already been used",
      ),
    }
  }
}

impl ApiError {
  pub fn unauthorized() -> Self {
    ApiError::Auth(AuthErrorKind::Unauthorized)
  }

  pub fn forbidden() -> Self {
    ApiError::Auth(AuthErrorKind::Forbidden)
  }

  /// Stable error code placed in the response body
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "validation_error",
      ApiError::Auth(kind) => kind.code_and_message().0,
      ApiError::Activation(kind) => kind.code_and_message().0,
      ApiError::Internal(_) => "internal_error",
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::Auth(kind) => write!(f, "Authentication error: {:?}", kind),
      ApiError::Activation(kind) => write!(f, "Activation error: {:?}", kind),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Auth(kind) => match kind {
        AuthErrorKind::Unauthorized
        | AuthErrorKind::InvalidCredentials
        | AuthErrorKind::AccountDisabled
        | AuthErrorKind::AccountNotActivated => StatusCode::UNAUTHORIZED,
        AuthErrorKind::Forbidden => StatusCode::FORBIDDEN,
        AuthErrorKind::EmailAlreadyExists => StatusCode::CONFLICT,
        AuthErrorKind::UserNotFound => StatusCode::NOT_FOUND,
      },
      ApiError::Activation(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let message = match self {
      ApiError::Validation(msg) => msg.clone(),
      ApiError::Auth(kind) => kind.code_and_message().1.to_string(),
      ApiError::Activation(kind) => kind.code_and_message().1.to_string(),
      ApiError::Internal(msg) => {
        // Don't expose internal error details
        tracing::error!("Internal error: {}", msg);
        "An internal server error occurred".to_string()
      }
    };

    let error_response = ErrorResponse {
      error: self.code().to_string(),
      message,
      details: None,
    };

    HttpResponse::build(self.status_code())
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Token failures collapse into one unauthorized response; minting failures
/// are server faults
impl From<TokenError> for ApiError {
  fn from(error: TokenError) -> Self {
    if error.is_rejection() {
      ApiError::unauthorized()
    } else {
      ApiError::Internal(error.to_string())
    }
  }
}

impl From<ActivationError> for ApiError {
  fn from(error: ActivationError) -> Self {
    match error {
      ActivationError::NotFound => ApiError::Activation(ActivationErrorKind::NotFound),
      ActivationError::Expired => ApiError::Activation(ActivationErrorKind::Expired),
      ActivationError::AlreadyUsed => ApiError::Activation(ActivationErrorKind::AlreadyUsed),
      ActivationError::Generation(msg) => ApiError::Internal(msg),
      ActivationError::Repository(err) => ApiError::Internal(err.to_string()),
    }
  }
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
  fn from(error: AuthError) -> Self {
    match error {
      AuthError::InvalidCredentials => ApiError::Auth(AuthErrorKind::InvalidCredentials),
      AuthError::EmailAlreadyExists => ApiError::Auth(AuthErrorKind::EmailAlreadyExists),
      AuthError::UserNotFound => ApiError::Auth(AuthErrorKind::UserNotFound),
      AuthError::AccountDisabled => ApiError::Auth(AuthErrorKind::AccountDisabled),
      AuthError::AccountNotActivated => ApiError::Auth(AuthErrorKind::AccountNotActivated),
      AuthError::Token(err) => err.into(),
      AuthError::Activation(err) => err.into(),
      AuthError::ValueObject(err) => ApiError::Validation(err.to_string()),
      AuthError::Repository(err) => match err {
        RepositoryError::NotFound => ApiError::Auth(AuthErrorKind::UserNotFound),
        RepositoryError::DuplicateKey(_) => ApiError::Auth(AuthErrorKind::EmailAlreadyExists),
        _ => ApiError::Internal(err.to_string()),
      },
      AuthError::Hash(err) => ApiError::Internal(err.to_string()),
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();
    messages.sort();

    ApiError::Validation(messages.join(", "))
  }
}
