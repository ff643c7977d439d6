//! Coordinator error taxonomy.
//!
//! Every failure that can surface from the coordinator is one of these
//! variants. The WebSocket boundary reports them as an `error` event to the
//! originating connection only; the HTTP boundary translates them to status
//! codes. Nothing here is fatal to the process.

use thiserror::Error;

/// Errors produced by the session coordinator and its data structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalingError {
    /// A room has reached its member capacity.
    #[error("room '{0}' is full")]
    RoomFull(String),

    /// A lookup against a room code that does not exist.
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// A private message targeted an identity with no live connection.
    #[error("recipient '{0}' is not connected")]
    RecipientOffline(String),

    /// A room code that fails format validation.
    #[error("invalid room code: {0}")]
    InvalidRoomCode(String),

    /// A user identity that fails format validation.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// Anything unexpected. Reported to the caller, never propagated up.
    #[error("internal failure: {0}")]
    Internal(String),
}
