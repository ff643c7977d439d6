//! UseCase: transport disconnect with a reconnection grace period.
//!
//! A disconnect never removes the participant immediately. The check is
//! scheduled for after the grace period and re-resolves the identity's
//! current connection when it fires; a reconnect in the window makes the
//! check a no-op. Schedule, don't cancel, re-check on fire — there is no
//! cancellation primitive to race against.
//!
//! Per-identity states: absent → bound → pending-removal → absent, with
//! pending-removal → bound on reconnect.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ConnId, MessagePusher};
use crate::infrastructure::dto::websocket::{ParticipantDto, ServerEvent};

use super::SharedState;

/// How long a disconnected participant may reconnect before being removed.
pub const DISCONNECT_GRACE: Duration = Duration::from_secs(5);

pub struct DisconnectUseCase {
    state: SharedState,
    pusher: Arc<dyn MessagePusher>,
    grace: Duration,
}

impl DisconnectUseCase {
    pub fn new(state: SharedState, pusher: Arc<dyn MessagePusher>, grace: Duration) -> Self {
        Self {
            state,
            pusher,
            grace,
        }
    }

    /// Schedule the removal check for a disconnected connection.
    pub fn schedule(self: &Arc<Self>, conn_id: ConnId) {
        tracing::debug!(
            "Connection '{}' disconnected; removal check in {:?}",
            conn_id,
            self.grace
        );
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.grace).await;
            this.finalize(conn_id).await;
        });
    }

    /// The grace-period check. Finalizes the departure only when the
    /// identity is still bound to the disconnected connection; a connection
    /// that never became a member is unbound without any broadcast.
    pub async fn finalize(&self, conn_id: ConnId) {
        let departure = {
            let mut state = self.state.lock().await;

            match state.identities.resolve_identity(&conn_id) {
                Some((identity, room_code))
                    if state.identities.resolve_connection(&identity) == Some(conn_id) =>
                {
                    let outcome = state.registry.remove_member(&room_code, &conn_id);
                    state.identities.unbind(&conn_id, &identity);
                    if outcome.removed {
                        let roster = state
                            .registry
                            .get(&room_code)
                            .map(|room| room.roster())
                            .unwrap_or_default();
                        Some((identity, room_code, roster))
                    } else {
                        None
                    }
                }
                // Superseded by a reconnect, or never bound: nothing left.
                _ => None,
            }
        };

        self.pusher.unregister(&conn_id).await;

        let Some((identity, room_code, roster)) = departure else {
            tracing::debug!("Removal check for connection '{}' was a no-op", conn_id);
            return;
        };

        let targets: Vec<ConnId> = roster.iter().map(|p| p.conn_id).collect();
        let left_event = ServerEvent::UserLeft {
            conn_id: conn_id.to_string(),
            identity: identity.as_str().to_string(),
        };
        self.pusher.broadcast(&targets, &left_event.to_json()).await;

        let update_event = ServerEvent::ParticipantsUpdate {
            count: roster.len(),
            participants: roster.iter().map(ParticipantDto::from).collect(),
        };
        self.pusher
            .broadcast(&targets, &update_event.to_json())
            .await;

        tracing::info!(
            "'{}' left room '{}' after the grace period ({} members remain)",
            identity,
            room_code,
            roster.len()
        );
    }
}
