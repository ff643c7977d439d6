//! UseCase: presence fan-out.
//!
//! Media-state changes, screen-share toggles, and recording notices are
//! broadcast to every room member except the sender — the sender already
//! knows its own local state. Nothing is persisted.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ConnId, MessagePusher, SignalingError};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::SharedState;

/// The presence-style events the coordinator fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceKind {
    MediaStateChange,
    ScreenShareStart,
    ScreenShareStop,
    RecordingStarted,
    RecordingStopped,
}

pub struct PresenceUseCase {
    state: SharedState,
    pusher: Arc<dyn MessagePusher>,
}

impl PresenceUseCase {
    pub fn new(state: SharedState, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { state, pusher }
    }

    pub async fn execute(
        &self,
        from_conn: ConnId,
        kind: PresenceKind,
        payload: Value,
    ) -> Result<(), SignalingError> {
        let (identity, targets) = {
            let state = self.state.lock().await;

            let (identity, room_code) = state
                .identities
                .resolve_identity(&from_conn)
                .ok_or_else(|| {
                    SignalingError::Internal("connection has not joined a room".to_string())
                })?;

            let targets: Vec<ConnId> = state
                .registry
                .get(&room_code)
                .map(|room| room.member_conn_ids())
                .unwrap_or_default()
                .into_iter()
                .filter(|c| *c != from_conn)
                .collect();
            (identity, targets)
        };

        let from = from_conn.to_string();
        let from_identity = identity.into_string();
        let event = match kind {
            PresenceKind::MediaStateChange => ServerEvent::MediaStateChange {
                from,
                from_identity,
                payload,
            },
            PresenceKind::ScreenShareStart => ServerEvent::ScreenShareStart {
                from,
                from_identity,
            },
            PresenceKind::ScreenShareStop => ServerEvent::ScreenShareStop {
                from,
                from_identity,
            },
            PresenceKind::RecordingStarted => ServerEvent::RecordingStarted {
                from,
                from_identity,
            },
            PresenceKind::RecordingStopped => ServerEvent::RecordingStopped {
                from,
                from_identity,
            },
        };

        self.pusher.broadcast(&targets, &event.to_json()).await;

        Ok(())
    }
}
