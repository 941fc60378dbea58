//! Connection management for WebSocket clients.
//!
//! Tracks the outbound channel of every live connection. Sessions and the
//! pending slot refer to connections only by [`ConnectionId`]; this registry is
//! the only place that knows how to reach one.

use dashmap::DashMap;
use tokio::sync::mpsc;

use gambit_domain::ConnectionId;
use gambit_shared::ServerMessage;

use crate::infrastructure::ports::OutboundPort;

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    senders: DashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            senders: DashMap::new(),
        }
    }

    /// Register a new connection's outbound channel.
    pub fn register(&self, connection_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        self.senders.insert(connection_id, sender);
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection. Later sends to it are dropped.
    pub fn unregister(&self, connection_id: ConnectionId) {
        if self.senders.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    pub fn is_connected(&self, connection_id: ConnectionId) -> bool {
        self.senders.contains_key(&connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.senders.len()
    }

    /// Queue a message for one connection without waiting.
    pub fn send(&self, connection_id: ConnectionId, message: ServerMessage) {
        let Some(sender) = self.senders.get(&connection_id) else {
            tracing::trace!(connection_id = %connection_id, "Dropping message for unknown connection");
            return;
        };
        if let Err(e) = sender.try_send(message) {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Failed to send message"
            );
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundPort for ConnectionManager {
    fn send(&self, connection_id: ConnectionId, message: ServerMessage) {
        ConnectionManager::send(self, connection_id, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_domain::{ClockSnapshot, Color};
    use gambit_shared::OpponentLeftPayload;

    fn tick() -> ServerMessage {
        ServerMessage::TimeUpdate(ClockSnapshot {
            white_time_ms: 1,
            black_time_ms: 2,
        })
    }

    #[tokio::test]
    async fn delivers_to_registered_connection() {
        let manager = ConnectionManager::new();
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::channel(4);
        manager.register(id, tx);

        manager.send(id, tick());

        assert_eq!(rx.recv().await, Some(tick()));
        assert!(manager.is_connected(id));
        assert_eq!(manager.connection_count(), 1);
    }

    #[tokio::test]
    async fn unknown_and_unregistered_connections_are_dropped() {
        let manager = ConnectionManager::new();
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::channel(4);
        manager.register(id, tx);
        manager.unregister(id);

        manager.send(id, tick());
        manager.send(ConnectionId::new(), tick());

        assert!(!manager.is_connected(id));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_channel_does_not_block() {
        let manager = ConnectionManager::new();
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::channel(1);
        manager.register(id, tx);

        manager.send(id, tick());
        manager.send(
            id,
            ServerMessage::OpponentLeft(OpponentLeftPayload::new(Color::White)),
        );

        assert_eq!(rx.recv().await, Some(tick()));
        assert!(rx.try_recv().is_err());
    }
}
