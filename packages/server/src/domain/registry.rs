//! Room registry: owns the mapping from room code to room state.
//!
//! Leaf component with no dependencies; mutated only by the session
//! coordinator and the janitor, always behind the coordinator's lock.

use std::collections::HashMap;

use super::entity::{Participant, Room, StoredMessage, HISTORY_LIMIT, ROOM_CAPACITY};
use super::error::SignalingError;
use super::value_object::{ConnId, Identity, RoomCode, Timestamp};

/// Result of a membership removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Whether a member was actually removed (false for absent members).
    pub removed: bool,
    /// Member count after the operation.
    pub remaining: usize,
}

/// In-memory registry of all rooms, keyed by normalized code.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    room_capacity: usize,
    history_limit: usize,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_limits(ROOM_CAPACITY, HISTORY_LIMIT)
    }

    /// Registry whose rooms are created with explicit limits. Tests use
    /// small limits to exercise the capacity and truncation invariants.
    pub fn with_limits(room_capacity: usize, history_limit: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            room_capacity,
            history_limit,
        }
    }

    /// Return the existing room for `code` or create it.
    ///
    /// Idempotent: a second call with the same code returns the same room;
    /// no duplicate is ever created.
    pub fn get_or_create(&mut self, code: &RoomCode, now: Timestamp) -> &mut Room {
        self.rooms.entry(code.clone()).or_insert_with(|| {
            Room::with_limits(code.clone(), now, self.room_capacity, self.history_limit)
        })
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Add a member to an existing room.
    pub fn add_member(
        &mut self,
        code: &RoomCode,
        participant: Participant,
    ) -> Result<(), SignalingError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| SignalingError::RoomNotFound(code.as_str().to_string()))?;
        room.add_member(participant)
    }

    /// Remove a member from a room. Idempotent; absent rooms and absent
    /// members both report `removed == false`.
    pub fn remove_member(&mut self, code: &RoomCode, conn_id: &ConnId) -> RemoveOutcome {
        match self.rooms.get_mut(code) {
            Some(room) => {
                let removed = room.remove_member(conn_id);
                RemoveOutcome {
                    removed,
                    remaining: room.member_count(),
                }
            }
            None => RemoveOutcome {
                removed: false,
                remaining: 0,
            },
        }
    }

    /// Construct, persist, and return a group chat message.
    pub fn append_message(
        &mut self,
        code: &RoomCode,
        body: String,
        sender: Identity,
        now: Timestamp,
    ) -> Result<StoredMessage, SignalingError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| SignalingError::RoomNotFound(code.as_str().to_string()))?;
        let message = StoredMessage::group(body, sender, now);
        room.push_message(message.clone());
        Ok(message)
    }

    /// Delete every room that is inactive and empty. Returns how many were
    /// removed. Safe to run at any time: it only touches rooms that are
    /// already out of use.
    pub fn sweep_empty(&mut self) -> usize {
        let before = self.rooms.len();
        self.rooms
            .retain(|_, room| room.is_active() || room.member_count() > 0);
        before - self.rooms.len()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
