//! Message delivery abstraction.
//!
//! The coordinator talks to connections only through this trait; the
//! WebSocket implementation lives in the infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::value_object::ConnId;

/// A frame queued for one connection's outbound task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PusherFrame {
    /// A serialized server event to deliver.
    Event(String),
    /// Close the connection. Sent when a newer connection for the same
    /// identity supersedes this one.
    Terminate,
}

/// Per-connection outbound channel. Unbounded: frames are small and
/// connections are evicted rather than throttled.
pub type PusherChannel = mpsc::UnboundedSender<PusherFrame>;

/// Errors from message delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not registered")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Delivery of serialized events to live connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Subscribe a connection: register its outbound channel.
    async fn register(&self, conn_id: ConnId, sender: PusherChannel);

    /// Drop a connection's outbound channel.
    async fn unregister(&self, conn_id: &ConnId);

    /// Force-close a connection and release its channel.
    async fn terminate(&self, conn_id: &ConnId);

    /// Deliver one event to one connection.
    async fn push_to(&self, conn_id: &ConnId, content: &str) -> Result<(), MessagePushError>;

    /// Deliver one event to each target, tolerating individual failures.
    async fn broadcast(&self, targets: &[ConnId], content: &str);
}
