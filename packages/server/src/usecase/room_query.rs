//! UseCases: read-side room queries for the HTTP surface, plus the
//! join-validation get-or-create.

use huddle_shared::time::now_utc_millis;

use crate::domain::{RoomCode, SignalingError, Timestamp};
use crate::infrastructure::dto::http::{JoinCheckDto, RoomDetailDto, RoomSummaryDto, StatsDto};

use super::SharedState;

/// List the currently active rooms.
pub struct GetRoomsUseCase {
    state: SharedState,
}

impl GetRoomsUseCase {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub async fn execute(&self) -> Vec<RoomSummaryDto> {
        let state = self.state.lock().await;
        let mut summaries: Vec<RoomSummaryDto> = state
            .registry
            .rooms()
            .filter(|room| room.is_active())
            .map(RoomSummaryDto::from)
            .collect();
        summaries.sort_by(|a, b| a.code.cmp(&b.code));
        summaries
    }
}

/// Full detail for one room.
pub struct GetRoomDetailUseCase {
    state: SharedState,
}

impl GetRoomDetailUseCase {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub async fn execute(&self, code: &str) -> Result<RoomDetailDto, SignalingError> {
        let code = RoomCode::new(code)?;
        let state = self.state.lock().await;
        state
            .registry
            .get(&code)
            .map(RoomDetailDto::from)
            .ok_or_else(|| SignalingError::RoomNotFound(code.as_str().to_string()))
    }
}

/// Join validation: make sure the room exists and still has space.
pub struct EnsureRoomUseCase {
    state: SharedState,
}

impl EnsureRoomUseCase {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub async fn execute(&self, code: &str) -> Result<JoinCheckDto, SignalingError> {
        let code = RoomCode::new(code)?;
        let now = Timestamp::new(now_utc_millis());

        let mut state = self.state.lock().await;
        let room = state.registry.get_or_create(&code, now);
        if room.is_full() {
            return Err(SignalingError::RoomFull(code.as_str().to_string()));
        }
        Ok(JoinCheckDto {
            code: room.code.as_str().to_string(),
            participant_count: room.member_count(),
            capacity: room.capacity(),
        })
    }
}

/// Aggregate coordinator statistics.
pub struct GetStatsUseCase {
    state: SharedState,
}

impl GetStatsUseCase {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub async fn execute(&self) -> StatsDto {
        let state = self.state.lock().await;
        let mut active_rooms = 0;
        let mut buffered_messages = 0;
        for room in state.registry.rooms() {
            if room.is_active() {
                active_rooms += 1;
            }
            buffered_messages += room.messages().len();
        }
        StatsDto {
            rooms: state.registry.room_count(),
            active_rooms,
            connections: state.identities.bound_connections(),
            buffered_messages,
        }
    }
}
