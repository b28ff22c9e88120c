use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::auth::ports::{Clock, RevocationStore};

/// Periodically drops revocation entries whose tokens have expired anyway.
/// Stops when `shutdown` is cancelled.
pub fn spawn_revocation_sweeper(
  store: Arc<dyn RevocationStore>,
  clock: Arc<dyn Clock>,
  interval: Duration,
  shutdown: CancellationToken,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately
    ticker.tick().await;

    loop {
      tokio::select! {
        _ = shutdown.cancelled() => {
          tracing::info!("Revocation sweeper stopped");
          break;
        }
        _ = ticker.tick() => {
          match store.sweep(clock.now()).await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "Swept revocation entries"),
            Err(e) => tracing::warn!("Revocation sweep failed: {}", e),
          }
        }
      }
    }
  })
}
