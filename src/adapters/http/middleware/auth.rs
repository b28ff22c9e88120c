use actix_web::{
  Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
  body::EitherBody,
  dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
  http::header::AUTHORIZATION,
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use crate::{
  adapters::http::errors::ApiError,
  domain::auth::{
    entities::Principal,
    errors::TokenError,
    services::TokenService,
    value_objects::{BearerToken, Role, TokenKind},
  },
  infrastructure::metrics,
};

/// Authentication gate.
///
/// Requests to a public path, and requests without an `Authorization`
/// header, pass through untouched; the handler decides whether it needs a
/// principal. Otherwise the header must carry a valid access token:
/// 1. The bearer token is parsed from the header
/// 2. `TokenService::validate` resolves it to a `Principal`
/// 3. The `Principal` and the presented `BearerToken` are attached to the
///    request extensions
/// 4. Any failure short-circuits with a uniform 401 and the reason is only
///    logged and counted
///
/// # Example
///
/// ```no_run
/// use actix_web::{App, web};
/// use std::sync::Arc;
/// # use taskflow::domain::auth::services::TokenService;
/// # use taskflow::adapters::http::middleware::auth::AuthMiddleware;
///
/// # fn example(token_service: Arc<TokenService>) {
/// let app = App::new()
///   .wrap(AuthMiddleware::new(token_service).with_public_paths(&["/login"]))
///   .service(
///     web::resource("/protected")
///       .route(web::get().to(|| async { "Protected endpoint" }))
///   );
/// # }
/// ```
pub struct AuthMiddleware {
  token_service: Arc<TokenService>,
  public_paths: Arc<[String]>,
}

impl AuthMiddleware {
  pub fn new(token_service: Arc<TokenService>) -> Self {
    Self {
      token_service,
      public_paths: Arc::from([]),
    }
  }

  /// Paths served without looking at the `Authorization` header, so a stale
  /// access token cannot block login or refresh
  pub fn with_public_paths(mut self, paths: &[&str]) -> Self {
    self.public_paths = paths.iter().map(|p| p.to_string()).collect();
    self
  }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = AuthMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(AuthMiddlewareService {
      service: Rc::new(service),
      token_service: self.token_service.clone(),
      public_paths: self.public_paths.clone(),
    }))
  }
}

pub struct AuthMiddlewareService<S> {
  service: Rc<S>,
  token_service: Arc<TokenService>,
  public_paths: Arc<[String]>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let token_service = self.token_service.clone();
    let is_public = self.public_paths.iter().any(|p| p == req.path());

    Box::pin(async move {
      if is_public {
        let res = service.call(req).await?;
        return Ok(res.map_into_left_body());
      }

      let token = match extract_bearer_token(&req) {
        Ok(None) => {
          let res = service.call(req).await?;
          return Ok(res.map_into_left_body());
        }
        Ok(Some(token)) => token,
        Err(e) => return Ok(reject(req, e)),
      };

      match token_service.validate(token.as_str(), TokenKind::Access).await {
        Ok(principal) => {
          req.extensions_mut().insert(principal);
          req.extensions_mut().insert(token);

          let res = service.call(req).await?;
          Ok(res.map_into_left_body())
        }
        Err(e) => Ok(reject(req, e)),
      }
    })
  }
}

fn reject<B>(req: ServiceRequest, error: TokenError) -> ServiceResponse<EitherBody<B>> {
  metrics::record_validation_failure(&error);
  tracing::debug!(
    path = %req.path(),
    kind = error.kind(),
    "Rejected bearer token"
  );

  let (request, _) = req.into_parts();
  let response = ApiError::unauthorized()
    .error_response()
    .map_into_right_body();
  ServiceResponse::new(request, response)
}

/// Reads `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent; an error when it is present but not
/// a usable bearer credential.
fn extract_bearer_token(req: &ServiceRequest) -> Result<Option<BearerToken>, TokenError> {
  let Some(header) = req.headers().get(AUTHORIZATION) else {
    return Ok(None);
  };

  let token = header
    .to_str()
    .ok()
    .and_then(|s| s.split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
    .map(|(_, token)| token)
    .ok_or_else(|| TokenError::Malformed("authorization header is not a bearer credential".into()))?;

  BearerToken::new(token.trim())
    .map(Some)
    .map_err(|e| TokenError::Malformed(e.to_string()))
}

/// Principal attached by [`AuthMiddleware`], as a handler argument.
///
/// Extraction fails with 401 when the gate attached nothing, which is how a
/// handler declares itself protected.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
  pub principal: Principal,
  pub token: BearerToken,
}

impl AuthenticatedPrincipal {
  /// 403 unless the principal's role grants `required`
  pub fn require_role(&self, required: Role) -> Result<(), ApiError> {
    if self.principal.has_role(required) {
      Ok(())
    } else {
      tracing::debug!(
        user_id = %self.principal.id,
        role = %self.principal.role,
        required = %required,
        "Insufficient role"
      );
      Err(ApiError::forbidden())
    }
  }
}

impl FromRequest for AuthenticatedPrincipal {
  type Error = ApiError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    let extensions = req.extensions();
    let authenticated = match (extensions.get::<Principal>(), extensions.get::<BearerToken>()) {
      (Some(principal), Some(token)) => Ok(AuthenticatedPrincipal {
        principal: principal.clone(),
        token: token.clone(),
      }),
      _ => Err(ApiError::unauthorized()),
    };

    ready(authenticated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;
  use uuid::Uuid;

  #[test]
  fn test_extract_bearer_token_valid() {
    let req = TestRequest::default()
      .insert_header(("Authorization", "Bearer test_token_123"))
      .to_srv_request();

    let token = extract_bearer_token(&req).unwrap().unwrap();
    assert_eq!(token.as_str(), "test_token_123");
  }

  #[test]
  fn test_extract_bearer_token_scheme_is_case_insensitive() {
    for value in ["bearer test_token_123", "BEARER test_token_123"] {
      let req = TestRequest::default()
        .insert_header(("Authorization", value))
        .to_srv_request();

      let token = extract_bearer_token(&req).unwrap().unwrap();
      assert_eq!(token.as_str(), "test_token_123");
    }
  }

  #[test]
  fn test_extract_bearer_token_missing() {
    let req = TestRequest::default().to_srv_request();

    assert!(extract_bearer_token(&req).unwrap().is_none());
  }

  #[test]
  fn test_extract_bearer_token_invalid_format() {
    for value in ["InvalidFormat token", "Bearer ", "Basic dXNlcjpwYXNz", "Bearer a b"] {
      let req = TestRequest::default()
        .insert_header(("Authorization", value))
        .to_srv_request();

      assert!(
        matches!(extract_bearer_token(&req), Err(TokenError::Malformed(_))),
        "{:?} should be rejected",
        value
      );
    }
  }

  fn authenticated(role: Role) -> AuthenticatedPrincipal {
    AuthenticatedPrincipal {
      principal: Principal {
        id: Uuid::new_v4(),
        email: "bob@example.com".to_string(),
        role,
        verified: true,
        enabled: true,
      },
      token: BearerToken::new("token").unwrap(),
    }
  }

  #[test]
  fn test_require_role() {
    assert!(authenticated(Role::Admin).require_role(Role::User).is_ok());
    assert!(authenticated(Role::Admin).require_role(Role::Admin).is_ok());

    let denied = authenticated(Role::User).require_role(Role::Admin);
    assert!(matches!(denied, Err(ApiError::Auth(_))));
    assert_eq!(denied.unwrap_err().code(), "forbidden");
  }

  #[actix_web::test]
  async fn test_extractor_without_principal_is_unauthorized() {
    let req = TestRequest::default().to_http_request();
    let result = AuthenticatedPrincipal::from_request(&req, &mut Payload::None).await;

    assert_eq!(result.unwrap_err().code(), "unauthorized");
  }

  #[actix_web::test]
  async fn test_extractor_reads_extensions() {
    let req = TestRequest::default().to_http_request();
    let expected = authenticated(Role::User);
    req.extensions_mut().insert(expected.principal.clone());
    req.extensions_mut().insert(expected.token.clone());

    let result = AuthenticatedPrincipal::from_request(&req, &mut Payload::None)
      .await
      .unwrap();
    assert_eq!(result.principal, expected.principal);
  }
}
