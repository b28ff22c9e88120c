use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::auth::{
  entities::UserAccount, errors::RepositoryError, ports::UserDirectory, value_objects::Email,
};

/// Process-local user directory, used when no database is configured
#[derive(Default)]
pub struct InMemoryUserDirectory {
  accounts: RwLock<HashMap<Uuid, UserAccount>>,
}

impl InMemoryUserDirectory {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
  async fn find_by_email(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError> {
    let accounts = self.accounts.read().await;
    Ok(
      accounts
        .values()
        .find(|account| account.email == email.as_str())
        .cloned(),
    )
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, RepositoryError> {
    Ok(self.accounts.read().await.get(&id).cloned())
  }

  async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError> {
    let accounts = self.accounts.read().await;
    Ok(
      accounts
        .values()
        .any(|account| account.email == email.as_str()),
    )
  }

  async fn save(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
    let mut accounts = self.accounts.write().await;

    let taken = accounts
      .values()
      .any(|existing| existing.email == account.email && existing.id != account.id);
    if taken {
      return Err(RepositoryError::DuplicateKey(format!(
        "email {} already registered",
        account.email
      )));
    }

    accounts.insert(account.id, account.clone());
    Ok(account)
  }

  async fn mark_verified(&self, id: Uuid) -> Result<bool, RepositoryError> {
    let mut accounts = self.accounts.write().await;
    let account = accounts.get_mut(&id).ok_or(RepositoryError::NotFound)?;

    if account.verified {
      return Ok(false);
    }
    account.verified = true;
    account.updated_at = Utc::now();
    Ok(true)
  }
}
