use actix_web::HttpResponse;
use serde_json::json;

use crate::adapters::http::errors::ApiError;
use crate::infrastructure::metrics;

/// GET /health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// GET /metrics
///
/// Prometheus text exposition of the default registry
pub async fn metrics_handler() -> Result<HttpResponse, ApiError> {
  let (content_type, body) =
    metrics::render().map_err(|e| ApiError::Internal(format!("metrics encoding: {}", e)))?;

  Ok(HttpResponse::Ok().content_type(content_type).body(body))
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{App, http::StatusCode, test, web};

  #[actix_web::test]
  async fn test_health_and_metrics() {
    let app = test::init_service(
      App::new()
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    metrics::record_token_revoked();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("taskflow_tokens_revoked_total"));
  }
}
