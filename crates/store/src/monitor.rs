//! Background reconnection monitor for the credential store.

use std::{sync::Arc, time::Duration};

use {
    tokio::task::JoinHandle,
    tracing::{debug, info},
};

use crate::CredentialStore;

/// Spawn the reconnection monitor for `store`.
///
/// While the store is degraded the monitor retries `connect()` with a
/// delay that grows with each failed attempt. After
/// `max_connect_attempts` consecutive failures it parks until
/// [`CredentialStore::retrigger`] is called, then starts a fresh budget.
pub fn spawn_monitor(store: Arc<CredentialStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let base = Duration::from_millis(store.settings().retry_base_ms);
        let max_attempts = store.settings().max_connect_attempts;
        let mut attempts: u32 = 0;

        loop {
            if store.is_connected().await {
                attempts = 0;
                tokio::time::sleep(base).await;
                continue;
            }

            if attempts >= max_attempts {
                info!(
                    attempts,
                    "credential store reconnect budget exhausted, waiting for retrigger"
                );
                store.retriggered().await;
                attempts = 0;
                continue;
            }

            attempts += 1;
            if store.connect().await {
                info!(attempts, "credential store reconnected");
                attempts = 0;
                continue;
            }

            let delay = base.saturating_mul(attempts);
            debug!(attempts, ?delay, "credential store still unreachable");
            tokio::time::sleep(delay).await;
        }
    })
}
