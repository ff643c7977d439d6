//! WebSocket event types.
//!
//! Every frame on the wire is a JSON object with a kebab-case `type` tag.
//! Inbound frames are validated into `ClientEvent` at the boundary;
//! anything malformed earns the sender an `error` event. Signaling payloads
//! (`offer` / `answer` / `ice-candidate`) stay opaque `serde_json::Value`s
//! — the coordinator transports them without interpretation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Participant, StoredMessage};

/// One room member as seen on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub conn_id: String,
    pub identity: String,
    pub joined_at: i64,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            conn_id: participant.conn_id.to_string(),
            identity: participant.identity.as_str().to_string(),
            joined_at: participant.joined_at.value(),
        }
    }
}

/// A chat or private message with its server-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub body: String,
    pub sender: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl From<StoredMessage> for MessageDto {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            body: message.body,
            sender: message.sender.into_string(),
            timestamp: message.timestamp.value(),
            recipient: message.recipient.map(|r| r.into_string()),
        }
    }
}

/// Events received from a connection.
///
/// Identity and room fields are only honored on `join-room`; everything
/// else resolves the sender through the server's own binding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom {
        room_code: String,
        identity: String,
    },
    Ping,
    Offer {
        to: String,
        payload: Value,
    },
    Answer {
        to: String,
        payload: Value,
    },
    IceCandidate {
        to: String,
        payload: Value,
    },
    ChatMessage {
        body: String,
    },
    PrivateMessage {
        body: String,
        recipient: String,
    },
    MediaStateChange {
        #[serde(default)]
        payload: Value,
    },
    ScreenShareStart,
    ScreenShareStop,
    RecordingStarted,
    RecordingStopped,
}

/// Events sent to connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Current peers, delivered to a joiner only (excluding itself).
    RoomParticipants { participants: Vec<ParticipantDto> },
    /// A new member, delivered to everyone but the joiner.
    UserJoined { conn_id: String, identity: String },
    /// Authoritative roster and count, delivered room-wide.
    ParticipantsUpdate {
        count: usize,
        participants: Vec<ParticipantDto>,
    },
    Pong,
    Offer {
        payload: Value,
        from: String,
        from_identity: String,
    },
    Answer {
        payload: Value,
        from: String,
        from_identity: String,
    },
    IceCandidate {
        payload: Value,
        from: String,
        from_identity: String,
    },
    ChatMessage { message: MessageDto },
    PrivateMessage { message: MessageDto },
    MediaStateChange {
        from: String,
        from_identity: String,
        payload: Value,
    },
    ScreenShareStart { from: String, from_identity: String },
    ScreenShareStop { from: String, from_identity: String },
    RecordingStarted { from: String, from_identity: String },
    RecordingStopped { from: String, from_identity: String },
    UserLeft { conn_id: String, identity: String },
    Error { message: String },
}

impl ServerEvent {
    /// Serialize for the wire. Serializing our own enum cannot fail.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server event serialization")
    }
}
