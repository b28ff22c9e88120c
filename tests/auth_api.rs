mod common;

use actix_web::{http::StatusCode, test};
use chrono::Duration;
use serde_json::Value;

use common::{PASSWORD, context, context_with, last_activation_token, login_request, me_request};
use taskflow::domain::auth::services::{AuthServiceConfig, TokenServiceConfig};

#[actix_web::test]
async fn test_register_then_login_then_me() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;

  let resp = test::call_service(
    &app,
    common::register_request("Alice@Example.com").to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["principal"]["email"], "alice@example.com");
  assert_eq!(body["principal"]["verified"], false);
  assert_eq!(body["principal"]["role"], "USER");

  let mail = ctx.mailer.last().await.unwrap();
  assert_eq!(mail.to, "alice@example.com");
  assert!(mail.body.contains("/auth/activate?token="));

  let resp = test::call_service(
    &app,
    login_request("alice@example.com", PASSWORD).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let tokens: Value = test::read_body_json(resp).await;
  assert_eq!(tokens["tokenType"], "Bearer");
  assert!(tokens["refreshToken"].is_string());
  let access = tokens["accessToken"].as_str().unwrap();

  let resp = test::call_service(&app, me_request(access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let me: Value = test::read_body_json(resp).await;
  assert_eq!(me["principal"]["email"], "alice@example.com");
}

#[actix_web::test]
async fn test_register_duplicate_and_invalid() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;

  let resp = test::call_service(&app, common::register_request("dup@example.com").to_request()).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = test::call_service(&app, common::register_request("DUP@example.com").to_request()).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "email_already_exists");

  let req = test::TestRequest::post()
    .uri("/auth/register")
    .set_json(serde_json::json!({ "email": "nope", "password": "short", "fullName": "" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("bob@example.com").to_request()).await;

  let wrong_password = test::call_service(
    &app,
    login_request("bob@example.com", "not-the-password").to_request(),
  )
  .await;
  assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
  let wrong_password: Value = test::read_body_json(wrong_password).await;

  let unknown = test::call_service(
    &app,
    login_request("nobody@example.com", PASSWORD).to_request(),
  )
  .await;
  assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
  let unknown: Value = test::read_body_json(unknown).await;

  assert_eq!(wrong_password, unknown);
  assert_eq!(unknown["error"], "invalid_credentials");
}

#[actix_web::test]
async fn test_protected_route_rejections_are_uniform() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("carol@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("carol@example.com", PASSWORD).to_request(),
  )
  .await;
  let refresh = tokens["refreshToken"].as_str().unwrap();

  let missing = test::TestRequest::get().uri("/auth/me").to_request();
  let malformed = test::TestRequest::get()
    .uri("/auth/me")
    .insert_header(("Authorization", "Token abc"))
    .to_request();
  let garbage = me_request("not.a.jwt").to_request();
  let wrong_kind = me_request(refresh).to_request();

  let mut bodies = Vec::new();
  for req in [missing, malformed, garbage, wrong_kind] {
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    bodies.push(body);
  }

  assert_eq!(bodies[0]["error"], "unauthorized");
  assert!(bodies.iter().all(|b| *b == bodies[0]));
}

#[actix_web::test]
async fn test_access_token_expires() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("dave@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("dave@example.com", PASSWORD).to_request(),
  )
  .await;
  let access = tokens["accessToken"].as_str().unwrap();

  ctx.clock.advance(Duration::minutes(59));
  let resp = test::call_service(&app, me_request(access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);

  ctx.clock.advance(Duration::minutes(2));
  let resp = test::call_service(&app, me_request(access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_revokes_token() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("erin@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("erin@example.com", PASSWORD).to_request(),
  )
  .await;
  let access = tokens["accessToken"].as_str().unwrap();

  let logout = test::TestRequest::delete()
    .uri("/auth/logout")
    .insert_header(("Authorization", format!("Bearer {}", access)))
    .to_request();
  let resp = test::call_service(&app, logout).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = test::call_service(&app, me_request(access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let anonymous = test::TestRequest::delete().uri("/auth/logout").to_request();
  let resp = test::call_service(&app, anonymous).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_token_flow() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("frank@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("frank@example.com", PASSWORD).to_request(),
  )
  .await;
  let access = tokens["accessToken"].as_str().unwrap();
  let refresh = tokens["refreshToken"].as_str().unwrap();

  ctx.clock.advance(Duration::minutes(30));

  let req = test::TestRequest::post()
    .uri("/auth/refresh-token")
    .set_json(serde_json::json!({ "refreshToken": refresh }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let refreshed: Value = test::read_body_json(resp).await;
  assert!(refreshed.get("refreshToken").is_none());
  assert_eq!(refreshed["principal"]["email"], "frank@example.com");

  let new_access = refreshed["accessToken"].as_str().unwrap();
  let resp = test::call_service(&app, me_request(new_access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);

  // An access token cannot stand in for a refresh token
  let req = test::TestRequest::post()
    .uri("/auth/refresh-token")
    .set_json(serde_json::json!({ "refreshToken": access }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "unauthorized");
}

#[actix_web::test]
async fn test_stale_access_header_does_not_block_public_routes() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("hank@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("hank@example.com", PASSWORD).to_request(),
  )
  .await;
  let access = tokens["accessToken"].as_str().unwrap();
  let refresh = tokens["refreshToken"].as_str().unwrap();
  let stale = ("Authorization", format!("Bearer {}", access));

  ctx.clock.advance(Duration::minutes(61));
  let resp = test::call_service(&app, me_request(access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post()
    .uri("/auth/refresh-token")
    .insert_header(stale.clone())
    .set_json(serde_json::json!({ "refreshToken": refresh }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let refreshed: Value = test::read_body_json(resp).await;
  let new_access = refreshed["accessToken"].as_str().unwrap();

  let resp = test::call_service(&app, me_request(new_access).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = login_request("hank@example.com", PASSWORD)
    .insert_header(stale)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_lowercase_bearer_scheme_is_accepted() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("ivy@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("ivy@example.com", PASSWORD).to_request(),
  )
  .await;
  let access = tokens["accessToken"].as_str().unwrap();

  let req = test::TestRequest::get()
    .uri("/auth/me")
    .insert_header(("Authorization", format!("bearer {}", access)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_refresh_with_rotation_returns_new_refresh_token() {
  let ctx = context_with(
    TokenServiceConfig::default().with_rotation(true),
    AuthServiceConfig::default(),
  );
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("gina@example.com").to_request()).await;
  let tokens: Value = test::call_and_read_body_json(
    &app,
    login_request("gina@example.com", PASSWORD).to_request(),
  )
  .await;

  let req = test::TestRequest::post()
    .uri("/auth/refresh-token")
    .set_json(serde_json::json!({ "refreshToken": tokens["refreshToken"] }))
    .to_request();
  let refreshed: Value = test::call_and_read_body_json(&app, req).await;

  assert!(refreshed["refreshToken"].is_string());
  assert_ne!(refreshed["refreshToken"], tokens["refreshToken"]);
}

#[actix_web::test]
async fn test_activation_link_is_single_use() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("hank@example.com").to_request()).await;
  let token = last_activation_token(&ctx.mailer).await;
  let uri = format!("/auth/activate?token={}", token);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["principal"]["verified"], true);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "activation_token_already_used");

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/auth/activate?token=unknown-token")
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "activation_token_not_found");
}

#[actix_web::test]
async fn test_expired_activation_link_and_resend() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("ivy@example.com").to_request()).await;
  let stale = last_activation_token(&ctx.mailer).await;

  ctx.clock.advance(Duration::hours(25));

  let uri = format!("/auth/activate?token={}", stale);
  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "activation_token_expired");

  let resend = test::TestRequest::post()
    .uri("/auth/resend-activation")
    .set_json(serde_json::json!({ "email": "ivy@example.com" }))
    .to_request();
  let resp = test::call_service(&app, resend).await;
  assert_eq!(resp.status(), StatusCode::ACCEPTED);
  assert_eq!(ctx.mailer.sent().await.len(), 2);

  let fresh = last_activation_token(&ctx.mailer).await;
  assert_ne!(fresh, stale);
  let uri = format!("/auth/activate?token={}", fresh);
  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_resend_for_unknown_email_is_accepted_silently() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;

  for email in ["ghost@example.com", "not-an-email"] {
    let req = test::TestRequest::post()
      .uri("/auth/resend-activation")
      .set_json(serde_json::json!({ "email": email }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
  }

  assert!(ctx.mailer.sent().await.is_empty());
}

#[actix_web::test]
async fn test_login_requires_activation_when_configured() {
  let ctx = context_with(
    TokenServiceConfig::default(),
    AuthServiceConfig {
      require_verified_email: true,
      ..AuthServiceConfig::default()
    },
  );
  let app = test::init_service(common::app(&ctx)).await;
  test::call_service(&app, common::register_request("jack@example.com").to_request()).await;

  let resp = test::call_service(
    &app,
    login_request("jack@example.com", PASSWORD).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "account_not_activated");

  let token = last_activation_token(&ctx.mailer).await;
  let uri = format!("/auth/activate?token={}", token);
  test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;

  let resp = test::call_service(
    &app,
    login_request("jack@example.com", PASSWORD).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_health_and_metrics_are_public() {
  let ctx = context();
  let app = test::init_service(common::app(&ctx)).await;

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().contains_key("x-request-id"));

  // A bad token on a public route is still refused by the gate
  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/metrics")
      .insert_header(("Authorization", "Bearer forged"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}
