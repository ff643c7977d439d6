//! UseCase: room-wide chat.
//!
//! Chat is persisted to the room's bounded history first, then the stored
//! message — carrying its server-assigned id and timestamp — is broadcast
//! to every member including the sender, so the sender's UI reflects the
//! authoritative record.

use std::sync::Arc;

use huddle_shared::time::now_utc_millis;

use crate::domain::{ConnId, MessagePusher, SignalingError, Timestamp};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::SharedState;

pub struct SendMessageUseCase {
    state: SharedState,
    pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(state: SharedState, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { state, pusher }
    }

    pub async fn execute(&self, from_conn: ConnId, body: String) -> Result<(), SignalingError> {
        let now = Timestamp::new(now_utc_millis());

        let (message, targets) = {
            let mut state = self.state.lock().await;

            let (identity, room_code) = state
                .identities
                .resolve_identity(&from_conn)
                .ok_or_else(|| {
                    SignalingError::Internal("connection has not joined a room".to_string())
                })?;

            let message = state
                .registry
                .append_message(&room_code, body, identity, now)?;
            let targets = state
                .registry
                .get(&room_code)
                .map(|room| room.member_conn_ids())
                .unwrap_or_default();
            (message, targets)
        };

        tracing::debug!(
            "Broadcasting chat message {} to {} members",
            message.id,
            targets.len()
        );

        let event = ServerEvent::ChatMessage {
            message: message.into(),
        };
        self.pusher.broadcast(&targets, &event.to_json()).await;

        Ok(())
    }
}
