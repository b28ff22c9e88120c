use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::auth::entities::RevocationEntry;
use crate::domain::auth::errors::RevocationError;
use crate::domain::auth::ports::{Clock, RevocationStore};
use crate::domain::auth::value_objects::TokenFingerprint;
use crate::infrastructure::metrics::REVOCATION_ENTRIES;

/// Process-local revocation set keyed by token fingerprint.
///
/// Every read and write goes through one `RwLock`, so a completed `revoke`
/// is visible to every `is_revoked` that starts afterwards.
pub struct InMemoryRevocationStore {
  entries: RwLock<HashMap<TokenFingerprint, RevocationEntry>>,
  clock: Arc<dyn Clock>,
  max_token_lifetime: Duration,
}

impl InMemoryRevocationStore {
  pub fn new(clock: Arc<dyn Clock>, max_token_lifetime: Duration) -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
      clock,
      max_token_lifetime,
    }
  }

  pub async fn len(&self) -> usize {
    self.entries.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.entries.read().await.is_empty()
  }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
  async fn revoke(&self, token: &str) -> Result<(), RevocationError> {
    let fingerprint = TokenFingerprint::of(token);
    let mut entries = self.entries.write().await;

    // Keep the original revocation time on repeat calls
    entries
      .entry(fingerprint.clone())
      .or_insert_with(|| RevocationEntry::new(fingerprint, self.clock.now()));

    REVOCATION_ENTRIES.set(entries.len() as i64);
    Ok(())
  }

  async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
    let fingerprint = TokenFingerprint::of(token);
    let now = self.clock.now();

    {
      let entries = self.entries.read().await;
      match entries.get(&fingerprint) {
        None => return Ok(false),
        Some(entry) if !entry.is_stale(now, self.max_token_lifetime) => return Ok(true),
        Some(_) => {}
      }
    }

    // Stale: the token has expired on its own, drop the entry
    let mut entries = self.entries.write().await;
    if let Some(entry) = entries.get(&fingerprint) {
      if !entry.is_stale(now, self.max_token_lifetime) {
        return Ok(true);
      }
      entries.remove(&fingerprint);
      REVOCATION_ENTRIES.set(entries.len() as i64);
    }

    Ok(false)
  }

  async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, RevocationError> {
    let mut entries = self.entries.write().await;
    let before = entries.len();

    entries.retain(|_, entry| !entry.is_stale(now, self.max_token_lifetime));

    REVOCATION_ENTRIES.set(entries.len() as i64);
    Ok(before - entries.len())
  }
}
