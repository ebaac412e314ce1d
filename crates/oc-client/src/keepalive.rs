//! Background keep-alive task
//!
//! The daemon drops idle sessions; a ping every minute keeps an established
//! session alive. The ping goes through the client's normal call path and
//! therefore shares its connection mutex, so it can never race a
//! user-initiated call. `ping` is excluded from latency tracking.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::CoreRpcClient;

/// Handle to the keep-alive task; cancelling it stops the pings
pub struct Pinger {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Pinger {
    /// Spawn the keep-alive loop
    ///
    /// Pings are only sent while the client holds a session token.
    pub fn spawn(rpc: Arc<CoreRpcClient>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; the first wait starts now
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if rpc.session_token().is_none() {
                            continue;
                        }
                        if let Err(e) = rpc.ping().await {
                            tracing::warn!("Keep-alive ping failed: {}", e);
                        }
                    }
                }
            }
        });

        Self { handle, cancel }
    }

    /// Stop the keep-alive loop
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Pinger {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
