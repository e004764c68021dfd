pub mod registry;
pub mod relay;

pub use registry::{Outbox, Recipient, Registry};
pub use relay::{Relay, RelayError};

use crate::config::PayloadLimits;
use std::time::Duration;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Registry,
    pub relay: Relay,
    /// Cancelled once the server starts shutting down
    pub shutdown: CancellationToken,
    /// Every upgraded connection task, so shutdown can wait for them
    pub connections: TaskTracker,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_limits(PayloadLimits::default())
    }

    pub fn with_limits(limits: PayloadLimits) -> Self {
        let registry = Registry::new();
        let relay = Relay::new(registry.clone(), limits);
        Self {
            registry,
            relay,
            shutdown: CancellationToken::new(),
            connections: TaskTracker::new(),
        }
    }

    /// Tell every connection to close and wait for their tasks to finish.
    ///
    /// Connections still open after `grace` are dropped from the registry.
    /// Returns false if the grace period ran out.
    pub async fn drain_connections(&self, grace: Duration) -> bool {
        self.shutdown.cancel();
        self.connections.close();

        let drained = tokio::time::timeout(grace, self.connections.wait())
            .await
            .is_ok();
        if !drained {
            tracing::warn!(
                remaining = self.connections.len(),
                "Connections did not close in time"
            );
            self.registry.close_all().await;
        }
        drained
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ServerMessage;
    use crate::types::ChatMessage;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_relay_shares_the_state_registry() {
        let state = AppState::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        state.registry.on_connect("a".to_string(), tx).await;

        let delivered = state
            .relay
            .on_chat_message(&"a".to_string(), ChatMessage::new("Alice", "hi", 1))
            .await
            .unwrap();

        assert_eq!(delivered, 1);
        assert!(matches!(rx.recv().await, Some(ServerMessage::ChatMessage(_))));
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_tracked_connections() {
        let state = AppState::new();
        let token = state.shutdown.clone();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();
        state.connections.spawn(async move {
            token.cancelled().await;
            let _ = done_tx.send(());
        });

        assert!(state.drain_connections(Duration::from_secs(1)).await);
        assert!(done_rx.try_recv().is_ok());
        assert!(state.connections.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_gives_up_after_grace() {
        let state = AppState::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        state.registry.on_connect("stuck".to_string(), tx).await;
        state.connections.spawn(std::future::pending::<()>());

        assert!(!state.drain_connections(Duration::from_millis(100)).await);
        assert!(state.registry.is_empty().await);
    }

    #[test]
    fn test_with_limits_is_applied() {
        let state = AppState::with_limits(PayloadLimits::unbounded());
        assert_eq!(state.relay.limits(), PayloadLimits::unbounded());
    }
}
