//! UseCase layer: the session coordinator's operations.
//!
//! All usecases share one `Arc<Mutex<SignalingState>>`, so every registry
//! and identity-map mutation is serialized behind a single lock
//! (single-writer semantics). Lock discipline: mutate state, collect an
//! outcome, drop the guard, then deliver through the pusher — the state
//! lock is never held across a pusher call.

pub mod disconnect;
pub mod heartbeat;
pub mod join_room;
pub mod presence;
pub mod relay_signal;
pub mod room_query;
pub mod send_message;
pub mod send_private_message;
pub mod sweep_rooms;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{IdentityMap, RoomRegistry};

pub use disconnect::{DisconnectUseCase, DISCONNECT_GRACE};
pub use heartbeat::HeartbeatUseCase;
pub use join_room::JoinRoomUseCase;
pub use presence::{PresenceKind, PresenceUseCase};
pub use relay_signal::{RelaySignalUseCase, SignalKind};
pub use room_query::{EnsureRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, GetStatsUseCase};
pub use send_message::SendMessageUseCase;
pub use send_private_message::SendPrivateMessageUseCase;
pub use sweep_rooms::{SweepRoomsUseCase, SWEEP_INTERVAL};

/// The coordinator's owned mutable state: room registry plus identity
/// mapping. Never shared outside the usecase layer.
#[derive(Debug, Default)]
pub struct SignalingState {
    pub registry: RoomRegistry,
    pub identities: IdentityMap,
}

impl SignalingState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Handle to the coordinator state shared by all usecases.
pub type SharedState = Arc<Mutex<SignalingState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SignalingState::new()))
}
