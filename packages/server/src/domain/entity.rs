//! Domain entities: rooms, participants, and stored messages.

use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

use super::error::SignalingError;
use super::value_object::{ConnId, Identity, RoomCode, Timestamp};

/// Maximum number of members a room admits.
pub const ROOM_CAPACITY: usize = 50;

/// Maximum number of messages a room retains; oldest are dropped first.
pub const HISTORY_LIMIT: usize = 100;

/// A member of a room: one live connection plus the logical user behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub conn_id: ConnId,
    pub identity: Identity,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(conn_id: ConnId, identity: Identity, joined_at: Timestamp) -> Self {
        Self {
            conn_id,
            identity,
            joined_at,
        }
    }
}

/// An immutable chat record owned by a room once appended.
///
/// `recipient` is `None` for group messages; private messages carry the
/// target identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: String,
    pub body: String,
    pub sender: Identity,
    pub timestamp: Timestamp,
    pub recipient: Option<Identity>,
}

impl StoredMessage {
    /// Build a group (broadcast) message with a server-assigned id.
    pub fn group(body: String, sender: Identity, timestamp: Timestamp) -> Self {
        Self {
            id: Self::generate_id(timestamp),
            body,
            sender,
            timestamp,
            recipient: None,
        }
    }

    /// Build a private message with a server-assigned id.
    pub fn private(
        body: String,
        sender: Identity,
        recipient: Identity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Self::generate_id(timestamp),
            body,
            sender,
            timestamp,
            recipient: Some(recipient),
        }
    }

    /// Monotonic-ish, collision-tolerant id: timestamp plus a random suffix.
    fn generate_id(timestamp: Timestamp) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", timestamp.value(), &suffix[..8])
    }
}

/// A named, capacity-bounded group of participants sharing signaling and chat.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub created_at: Timestamp,
    members: HashMap<ConnId, Participant>,
    messages: VecDeque<StoredMessage>,
    active: bool,
    capacity: usize,
    history_limit: usize,
}

impl Room {
    pub fn new(code: RoomCode, created_at: Timestamp) -> Self {
        Self::with_limits(code, created_at, ROOM_CAPACITY, HISTORY_LIMIT)
    }

    /// Constructor with explicit limits, used by tests to exercise the
    /// capacity and history invariants without building 50 members.
    pub fn with_limits(
        code: RoomCode,
        created_at: Timestamp,
        capacity: usize,
        history_limit: usize,
    ) -> Self {
        Self {
            code,
            created_at,
            members: HashMap::new(),
            messages: VecDeque::new(),
            active: false,
            capacity,
            history_limit,
        }
    }

    /// Add a member. Fails with `RoomFull` without mutating membership when
    /// the room is at capacity.
    pub fn add_member(&mut self, participant: Participant) -> Result<(), SignalingError> {
        if self.members.len() >= self.capacity {
            return Err(SignalingError::RoomFull(self.code.as_str().to_string()));
        }
        self.members.insert(participant.conn_id, participant);
        self.active = true;
        Ok(())
    }

    /// Remove a member. Idempotent: removing an absent member is a no-op.
    /// Returns whether a member was actually removed. The room goes
    /// inactive when the last member leaves.
    pub fn remove_member(&mut self, conn_id: &ConnId) -> bool {
        let removed = self.members.remove(conn_id).is_some();
        if self.members.is_empty() {
            self.active = false;
        }
        removed
    }

    pub fn member(&self, conn_id: &ConnId) -> Option<&Participant> {
        self.members.get(conn_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member_conn_ids(&self) -> Vec<ConnId> {
        self.members.keys().copied().collect()
    }

    /// Member list sorted by join time (ties broken by handle) for a stable
    /// roster on the wire.
    pub fn roster(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self.members.values().cloned().collect();
        participants.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.conn_id.to_string().cmp(&b.conn_id.to_string()))
        });
        participants
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a message, dropping the oldest entries past the history limit.
    pub fn push_message(&mut self, message: StoredMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.history_limit {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> &VecDeque<StoredMessage> {
        &self.messages
    }
}
