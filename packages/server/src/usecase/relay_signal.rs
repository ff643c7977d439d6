//! UseCase: targeted signaling relay (offer / answer / ICE candidate).
//!
//! Payloads are never inspected; the coordinator stamps them with the
//! sender's handle and identity and forwards them to exactly one
//! connection. A missing target is a silent no-op — stale signaling
//! targets are expected under churn.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ConnId, MessagePusher, SignalingError};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::SharedState;

/// Which of the three call-setup events is being relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

pub struct RelaySignalUseCase {
    state: SharedState,
    pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    pub fn new(state: SharedState, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { state, pusher }
    }

    /// Relay `payload` from `from_conn` to the connection named by `to`.
    pub async fn execute(
        &self,
        from_conn: ConnId,
        to: &str,
        kind: SignalKind,
        payload: Value,
    ) -> Result<(), SignalingError> {
        let Some(target) = ConnId::parse(to) else {
            // Not a handle we ever issued; treat like any stale target.
            tracing::debug!("Dropping {:?} aimed at unparseable target '{}'", kind, to);
            return Ok(());
        };

        let from_identity = {
            let state = self.state.lock().await;
            match state.identities.resolve_identity(&from_conn) {
                Some((identity, _)) => identity,
                None => {
                    return Err(SignalingError::Internal(
                        "connection has not joined a room".to_string(),
                    ));
                }
            }
        };

        let from = from_conn.to_string();
        let from_identity = from_identity.into_string();
        let event = match kind {
            SignalKind::Offer => ServerEvent::Offer {
                payload,
                from,
                from_identity,
            },
            SignalKind::Answer => ServerEvent::Answer {
                payload,
                from,
                from_identity,
            },
            SignalKind::IceCandidate => ServerEvent::IceCandidate {
                payload,
                from,
                from_identity,
            },
        };

        if let Err(e) = self.pusher.push_to(&target, &event.to_json()).await {
            // The peer hung up between the sender's snapshot and now.
            tracing::debug!("Dropping {:?} for gone connection '{}': {}", kind, target, e);
        }

        Ok(())
    }
}
