//! HTTP API response types.

use serde::{Deserialize, Serialize};

use huddle_shared::time::millis_to_rfc3339;

use crate::domain::Room;

/// One room in the active-room listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub code: String,
    pub participant_count: usize,
    pub active: bool,
    pub created_at: String,
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.as_str().to_string(),
            participant_count: room.member_count(),
            active: room.is_active(),
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

/// One member in a room detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub conn_id: String,
    pub identity: String,
    pub joined_at: String,
}

/// Full room info for the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub code: String,
    pub created_at: String,
    pub active: bool,
    pub capacity: usize,
    pub participant_count: usize,
    pub participants: Vec<ParticipantDetailDto>,
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.as_str().to_string(),
            created_at: millis_to_rfc3339(room.created_at.value()),
            active: room.is_active(),
            capacity: room.capacity(),
            participant_count: room.member_count(),
            participants: room
                .roster()
                .iter()
                .map(|p| ParticipantDetailDto {
                    conn_id: p.conn_id.to_string(),
                    identity: p.identity.as_str().to_string(),
                    joined_at: millis_to_rfc3339(p.joined_at.value()),
                })
                .collect(),
        }
    }
}

/// Join-validation response: can this room still be joined?
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinCheckDto {
    pub code: String,
    pub participant_count: usize,
    pub capacity: usize,
}

/// Aggregate coordinator statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDto {
    pub rooms: usize,
    pub active_rooms: usize,
    pub connections: usize,
    pub buffered_messages: usize,
}

/// Metadata sidecar written next to an uploaded recording, also echoed in
/// the upload response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMetadataDto {
    pub id: String,
    pub room_code: String,
    pub uploader: String,
    pub duration_secs: u64,
    pub size_bytes: usize,
    pub uploaded_at: String,
}
