//! WebSocket-backed `MessagePusher`.
//!
//! Owns the map from connection handle to the connection's outbound
//! channel. WebSocket creation happens in the UI layer
//! (`ui/handler/websocket.rs`); this implementation only manages the
//! resulting senders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnId, MessagePushError, MessagePusher, PusherChannel, PusherFrame};

/// Delivery over per-connection mpsc channels feeding WebSocket send tasks.
pub struct WebSocketMessagePusher {
    /// Outbound channel for each live connection.
    connections: Arc<Mutex<HashMap<ConnId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, conn_id: ConnId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(conn_id, sender);
        tracing::debug!("Connection '{}' registered to pusher", conn_id);
    }

    async fn unregister(&self, conn_id: &ConnId) {
        let mut connections = self.connections.lock().await;
        connections.remove(conn_id);
        tracing::debug!("Connection '{}' unregistered from pusher", conn_id);
    }

    async fn terminate(&self, conn_id: &ConnId) {
        let mut connections = self.connections.lock().await;
        if let Some(sender) = connections.remove(conn_id) {
            // Best effort: the send task may already be gone.
            let _ = sender.send(PusherFrame::Terminate);
            tracing::debug!("Connection '{}' terminated", conn_id);
        }
    }

    async fn push_to(&self, conn_id: &ConnId, content: &str) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(conn_id) {
            sender
                .send(PusherFrame::Event(content.to_string()))
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed event to connection '{}'", conn_id);
            Ok(())
        } else {
            Err(MessagePushError::ConnectionNotFound(conn_id.to_string()))
        }
    }

    async fn broadcast(&self, targets: &[ConnId], content: &str) {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(target) {
                // Individual send failures are tolerated during broadcast.
                if let Err(e) = sender.send(PusherFrame::Event(content.to_string())) {
                    tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                }
            } else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
            }
        }
    }
}
