use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::domain::auth::ports::TokenGenerator;
use crate::domain::auth::value_objects::ValueObjectError;

const TOKEN_BYTES: usize = 32;

/// Generates activation tokens from the OS CSPRNG
pub struct SecureTokenGenerator;

impl SecureTokenGenerator {
  pub fn new() -> Self {
    Self
  }
}

impl Default for SecureTokenGenerator {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl TokenGenerator for SecureTokenGenerator {
  /// 32 random bytes, base64url without padding (43 characters)
  async fn generate(&self) -> Result<String, ValueObjectError> {
    let mut token_bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng
      .try_fill_bytes(&mut token_bytes)
      .map_err(|e| ValueObjectError::TokenGenerationFailed(e.to_string()))?;

    Ok(URL_SAFE_NO_PAD.encode(token_bytes))
  }
}
