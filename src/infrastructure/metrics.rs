use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, TextEncoder};

use crate::domain::auth::errors::TokenError;
use crate::domain::auth::value_objects::TokenKind;

lazy_static! {
  pub static ref TOKEN_VALIDATION_FAILURES: IntCounterVec = prometheus::register_int_counter_vec!(
    "taskflow_token_validation_failures_total",
    "Bearer tokens refused, by reason",
    &["kind"]
  )
  .unwrap();

  pub static ref TOKENS_ISSUED: IntCounterVec = prometheus::register_int_counter_vec!(
    "taskflow_tokens_issued_total",
    "Bearer tokens issued, by token kind",
    &["kind"]
  )
  .unwrap();

  pub static ref TOKENS_REVOKED: IntCounter = prometheus::register_int_counter!(
    "taskflow_tokens_revoked_total",
    "Tokens revoked before their natural expiry"
  )
  .unwrap();

  pub static ref REVOCATION_ENTRIES: IntGauge = prometheus::register_int_gauge!(
    "taskflow_revocation_entries",
    "Entries currently held by the in-process revocation store"
  )
  .unwrap();
}

pub fn record_validation_failure(error: &TokenError) {
  TOKEN_VALIDATION_FAILURES
    .with_label_values(&[error.kind()])
    .inc();
}

pub fn record_token_issued(kind: TokenKind) {
  TOKENS_ISSUED.with_label_values(&[kind.as_str()]).inc();
}

pub fn record_token_revoked() {
  TOKENS_REVOKED.inc();
}

/// Renders the default registry in the Prometheus text format
pub fn render() -> Result<(String, Vec<u8>), prometheus::Error> {
  let encoder = TextEncoder::new();
  let mut buffer = Vec::new();
  encoder.encode(&prometheus::gather(), &mut buffer)?;
  Ok((encoder.format_type().to_string(), buffer))
}
