use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::auth::entities::Principal;
use crate::domain::auth::value_objects::Role;

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Request for user registration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
  #[validate(email(message = "Invalid email format"))]
  pub email: String,

  #[validate(length(
    min = 8,
    max = 128,
    message = "Password must be between 8 and 128 characters"
  ))]
  pub password: String,

  #[validate(length(
    min = 1,
    max = 255,
    message = "Full name must be between 1 and 255 characters"
  ))]
  pub full_name: String,
}

/// Request for user login.
///
/// Only presence is checked here; a malformed email is answered like any
/// other credential mismatch.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
  #[validate(length(min = 1, max = 255, message = "Email is required"))]
  pub email: String,

  #[validate(length(min = 1, max = 1024, message = "Password is required"))]
  pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
  #[validate(length(min = 1, message = "Refresh token is required"))]
  pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendActivationRequest {
  pub email: String,
}

/// Query string of an activation link
#[derive(Debug, Clone, Deserialize)]
pub struct ActivateQuery {
  #[serde(default)]
  pub token: String,
}

/// Public view of a principal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalDto {
  pub id: Uuid,
  pub email: String,
  pub role: Role,
  pub verified: bool,
  pub enabled: bool,
}

impl From<Principal> for PrincipalDto {
  fn from(principal: Principal) -> Self {
    Self {
      id: principal.id,
      email: principal.email,
      role: principal.role,
      verified: principal.verified,
      enabled: principal.enabled,
    }
  }
}

/// Tokens returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
  pub access_token: String,

  /// Absent on refresh unless rotation is enabled
  #[serde(skip_serializing_if = "Option::is_none")]
  pub refresh_token: Option<String>,

  pub token_type: String,

  /// Access token expiration timestamp
  pub expires_at: DateTime<Utc>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub refresh_expires_at: Option<DateTime<Utc>>,

  pub principal: PrincipalDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
  pub principal: PrincipalDto,
  pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResponse {
  pub principal: PrincipalDto,
  pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
  pub principal: PrincipalDto,
}

/// Standard success response for operations without data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
  pub message: String,
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Stable error code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_register_request_uses_camel_case() {
    let json = r#"{"email": "test@example.com", "password": "SecureP@ss123", "fullName": "Test User"}"#;
    let request: RegisterRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.full_name, "Test User");
    assert!(request.validate().is_ok());
  }

  #[test]
  fn test_register_request_validation() {
    let valid = RegisterRequest {
      email: "test@example.com".to_string(),
      password: "SecureP@ss123".to_string(),
      full_name: "Test User".to_string(),
    };
    assert!(valid.validate().is_ok());

    let bad_email = RegisterRequest {
      email: "invalid-email".to_string(),
      ..valid.clone()
    };
    assert!(bad_email.validate().is_err());

    let short_password = RegisterRequest {
      password: "short".to_string(),
      ..valid
    };
    assert!(short_password.validate().is_err());
  }

  #[test]
  fn test_login_request_only_checks_presence() {
    let request = LoginRequest {
      email: "not-an-email".to_string(),
      password: "x".to_string(),
    };
    assert!(request.validate().is_ok());

    let empty = LoginRequest {
      email: String::new(),
      password: String::new(),
    };
    assert!(empty.validate().is_err());
  }

  #[test]
  fn test_refresh_request_field_name() {
    let request: RefreshTokenRequest =
      serde_json::from_str(r#"{"refreshToken": "abc"}"#).unwrap();
    assert_eq!(request.refresh_token, "abc");
  }

  #[test]
  fn test_token_response_shape() {
    let response = TokenResponse {
      access_token: "a".to_string(),
      refresh_token: None,
      token_type: TOKEN_TYPE_BEARER.to_string(),
      expires_at: Utc::now(),
      refresh_expires_at: None,
      principal: PrincipalDto {
        id: Uuid::new_v4(),
        email: "a@example.com".to_string(),
        role: Role::User,
        verified: false,
        enabled: true,
      },
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["tokenType"], "Bearer");
    assert_eq!(json["principal"]["role"], "USER");
    assert!(json.get("accessToken").is_some());
    assert!(json.get("refreshToken").is_none());
  }
}
