//! Shared application state handed to the axum handlers.

use std::sync::Arc;

use crate::infrastructure::recording::RecordingStore;
use crate::usecase::{
    DisconnectUseCase, EnsureRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, GetStatsUseCase,
    HeartbeatUseCase, JoinRoomUseCase, PresenceUseCase, RelaySignalUseCase, SendMessageUseCase,
    SendPrivateMessageUseCase,
};

/// Shared application state
pub struct AppState {
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub heartbeat_usecase: Arc<HeartbeatUseCase>,
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub send_private_message_usecase: Arc<SendPrivateMessageUseCase>,
    pub presence_usecase: Arc<PresenceUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub ensure_room_usecase: Arc<EnsureRoomUseCase>,
    pub get_stats_usecase: Arc<GetStatsUseCase>,
    pub recording_store: Arc<RecordingStore>,
}
