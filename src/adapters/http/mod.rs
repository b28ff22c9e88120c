pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use dtos::{
  ActivationResponse, CurrentUserResponse, ErrorResponse, LoginRequest, PrincipalDto,
  RefreshTokenRequest, RegisterRequest, RegisterResponse, SuccessResponse, TokenResponse,
};
pub use errors::{ActivationErrorKind, ApiError, AuthErrorKind};
pub use middleware::{
  AuthMiddleware, AuthenticatedPrincipal, RequestId, RequestIdExt, RequestIdMiddleware,
};
pub use routes::{
  AuthRouteDependencies, PUBLIC_PATHS, configure_auth_routes, configure_health_routes,
};
