use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::auth::{
  entities::ActivationToken, errors::RepositoryError, ports::ActivationTokenRepository,
};

/// Process-local activation token store
#[derive(Default)]
pub struct InMemoryActivationTokenRepository {
  tokens: RwLock<HashMap<Uuid, ActivationToken>>,
}

impl InMemoryActivationTokenRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ActivationTokenRepository for InMemoryActivationTokenRepository {
  async fn issue(&self, token: ActivationToken) -> Result<ActivationToken, RepositoryError> {
    let mut tokens = self.tokens.write().await;

    if tokens
      .values()
      .any(|existing| existing.token_value == token.token_value)
    {
      return Err(RepositoryError::DuplicateKey(
        "activation token value".to_string(),
      ));
    }

    for outstanding in tokens
      .values_mut()
      .filter(|existing| existing.user_id == token.user_id && !existing.consumed)
    {
      outstanding.consumed = true;
    }

    tokens.insert(token.id, token.clone());
    Ok(token)
  }

  async fn find_by_value(&self, value: &str) -> Result<Option<ActivationToken>, RepositoryError> {
    let tokens = self.tokens.read().await;
    Ok(
      tokens
        .values()
        .find(|token| token.token_value == value)
        .cloned(),
    )
  }

  async fn mark_consumed(&self, id: Uuid) -> Result<bool, RepositoryError> {
    let mut tokens = self.tokens.write().await;
    let token = tokens.get_mut(&id).ok_or(RepositoryError::NotFound)?;

    if token.consumed {
      return Ok(false);
    }
    token.consumed = true;
    Ok(true)
  }
}
