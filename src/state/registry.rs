use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Sending half of a connection's outbound queue
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug)]
struct ConnectionEntry {
    display_name: Option<String>,
    outbox: Outbox,
}

/// Point-in-time view of one recipient, taken for a single fan-out
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: ConnectionId,
    pub outbox: Outbox,
}

/// Tracks every open connection and its optional display name.
///
/// Cheap to clone; all clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    connections: Arc<RwLock<HashMap<ConnectionId, ConnectionEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh connection id
    pub fn next_id() -> ConnectionId {
        ulid::Ulid::new().to_string()
    }

    /// Record a newly opened connection
    pub async fn on_connect(&self, id: ConnectionId, outbox: Outbox) {
        let mut connections = self.connections.write().await;
        connections.insert(
            id.clone(),
            ConnectionEntry {
                display_name: None,
                outbox,
            },
        );
        tracing::info!(connection_id = %id, active = connections.len(), "Client connected");
    }

    /// Attach a display name to an open connection.
    ///
    /// Names are not checked for uniqueness and a second join replaces the first.
    /// Returns false if the connection is already closed.
    pub async fn on_join(&self, id: &ConnectionId, display_name: String) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get_mut(id) {
            Some(entry) => {
                tracing::info!(connection_id = %id, name = %display_name, "Client joined");
                entry.display_name = Some(display_name);
                true
            }
            None => {
                tracing::debug!(connection_id = %id, "Ignoring join for closed connection");
                false
            }
        }
    }

    /// Remove a connection. Returns whether anything was removed, so a second call is a no-op.
    pub async fn on_disconnect(&self, id: &ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(id).is_some();
        if removed {
            tracing::info!(connection_id = %id, active = connections.len(), "Client disconnected");
        }
        removed
    }

    pub async fn state_of(&self, id: &ConnectionId) -> ConnectionState {
        match self.connections.read().await.get(id) {
            Some(entry) if entry.display_name.is_some() => ConnectionState::Identified,
            Some(_) => ConnectionState::Connected,
            None => ConnectionState::Closed,
        }
    }

    pub async fn display_name(&self, id: &ConnectionId) -> Option<String> {
        self.connections
            .read()
            .await
            .get(id)
            .and_then(|entry| entry.display_name.clone())
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Clone the current recipient set, optionally leaving one connection out.
    ///
    /// The read lock is released before the caller sends anything.
    pub async fn snapshot(&self, except: Option<&ConnectionId>) -> Vec<Recipient> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(id, _)| Some(*id) != except)
            .map(|(id, entry)| Recipient {
                id: id.clone(),
                outbox: entry.outbox.clone(),
            })
            .collect()
    }

    /// Drop every connection, used on server shutdown.
    ///
    /// Dropping the outboxes ends each connection's task.
    pub async fn close_all(&self) -> usize {
        let mut connections = self.connections.write().await;
        let count = connections.len();
        connections.clear();
        tracing::info!(count, "Closed all connections");
        count
    }
}
