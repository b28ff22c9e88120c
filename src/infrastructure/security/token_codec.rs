use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::auth::entities::AccessClaims;
use crate::domain::auth::errors::CodecError;
use crate::domain::auth::ports::TokenCodec;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_SECRET_BYTES: usize = 32;
const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
  alg: String,
  typ: String,
}

/// HS256 codec producing JWT compact serialization:
/// `base64url(header).base64url(claims).base64url(mac)`
pub struct HmacTokenCodec {
  secret: Zeroizing<Vec<u8>>,
  encoded_header: String,
}

impl HmacTokenCodec {
  /// # Errors
  /// `CodecError::WeakKey` if the secret is shorter than 32 bytes
  pub fn new(secret: &[u8]) -> Result<Self, CodecError> {
    if secret.len() < MIN_SECRET_BYTES {
      return Err(CodecError::WeakKey(format!(
        "secret must be at least {} bytes, got {}",
        MIN_SECRET_BYTES,
        secret.len()
      )));
    }

    let header = Header {
      alg: ALGORITHM.to_string(),
      typ: TOKEN_TYPE.to_string(),
    };
    let header_json =
      serde_json::to_vec(&header).map_err(|e| CodecError::Serialization(e.to_string()))?;

    Ok(Self {
      secret: Zeroizing::new(secret.to_vec()),
      encoded_header: URL_SAFE_NO_PAD.encode(header_json),
    })
  }

  fn mac(&self) -> Result<HmacSha256, CodecError> {
    HmacSha256::new_from_slice(&self.secret).map_err(|e| CodecError::WeakKey(e.to_string()))
  }
}

impl TokenCodec for HmacTokenCodec {
  fn encode(&self, claims: &AccessClaims) -> Result<String, CodecError> {
    let claims_json =
      serde_json::to_vec(claims).map_err(|e| CodecError::Serialization(e.to_string()))?;
    let signing_input = format!(
      "{}.{}",
      self.encoded_header,
      URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = self.mac()?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
  }

  fn decode(&self, token: &str) -> Result<AccessClaims, CodecError> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
      segments.next(),
      segments.next(),
      segments.next(),
      segments.next(),
    ) else {
      return Err(CodecError::Malformed(
        "expected three dot-separated segments".to_string(),
      ));
    };

    let header_bytes = URL_SAFE_NO_PAD
      .decode(header)
      .map_err(|e| CodecError::Malformed(format!("header encoding: {}", e)))?;
    let parsed: Header = serde_json::from_slice(&header_bytes)
      .map_err(|e| CodecError::Malformed(format!("header: {}", e)))?;

    if parsed.alg != ALGORITHM {
      return Err(CodecError::UnsupportedAlgorithm(parsed.alg));
    }

    let signature = URL_SAFE_NO_PAD
      .decode(signature)
      .map_err(|e| CodecError::Malformed(format!("signature encoding: {}", e)))?;

    let signing_input_len = header.len() + 1 + claims.len();
    let mut mac = self.mac()?;
    mac.update(&token.as_bytes()[..signing_input_len]);
    mac
      .verify_slice(&signature)
      .map_err(|_| CodecError::SignatureMismatch)?;

    let claims_bytes = URL_SAFE_NO_PAD
      .decode(claims)
      .map_err(|e| CodecError::Malformed(format!("claims encoding: {}", e)))?;

    serde_json::from_slice(&claims_bytes).map_err(|e| CodecError::Malformed(format!("claims: {}", e)))
  }
}
