//! UseCase: join a room.
//!
//! Implements the join protocol: reconcile any previous connection for the
//! same identity, subscribe the new connection, bind it, admit it to the
//! room, then emit the three join events in a fixed order —
//! `room-participants` to the joiner, `user-joined` to its peers,
//! `participants-update` to the whole room. Each connection's outbound
//! events flow through one ordered queue, so the joiner always holds its
//! peer list before any peer learns of it; no timers are involved.

use std::sync::Arc;

use huddle_shared::time::now_utc_millis;

use crate::domain::{
    ConnId, Identity, MessagePusher, Participant, PusherChannel, RoomCode, SignalingError,
    Timestamp,
};
use crate::infrastructure::dto::websocket::{ParticipantDto, ServerEvent};

use super::SharedState;

pub struct JoinRoomUseCase {
    state: SharedState,
    pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    pub fn new(state: SharedState, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { state, pusher }
    }

    /// Admit `conn_id` to `room_code` as `identity`.
    ///
    /// On `RoomFull` the connection stays subscribed (the caller decides
    /// whether to hang up) but is not a member; the error is returned
    /// synchronously for the caller to report.
    pub async fn execute(
        &self,
        conn_id: ConnId,
        room_code: &str,
        identity: &str,
        sender: PusherChannel,
    ) -> Result<(), SignalingError> {
        let room_code = RoomCode::new(room_code)?;
        let identity = Identity::new(identity)?;

        // Subscribe before any state mutation so every event emitted below
        // reaches the joiner.
        self.pusher.register(conn_id, sender).await;

        let now = Timestamp::new(now_utc_millis());

        let (evicted, departures, admitted) = {
            let mut state = self.state.lock().await;

            // Departures from other rooms caused by this join; each carries
            // the leaver and the room's remaining roster to notify.
            let mut departures: Vec<(ConnId, Identity, Vec<Participant>)> = Vec::new();

            // A connection switching rooms leaves its old room first.
            if let Some((old_identity, old_room)) = state.identities.resolve_identity(&conn_id) {
                if old_room != room_code {
                    let outcome = state.registry.remove_member(&old_room, &conn_id);
                    if outcome.removed {
                        let remaining = state
                            .registry
                            .get(&old_room)
                            .map(|room| room.roster())
                            .unwrap_or_default();
                        departures.push((conn_id, old_identity, remaining));
                    }
                }
            }

            // Reconciliation: the same identity joining again (page reload,
            // racing reconnect) supersedes its previous connection. For a
            // same-room rejoin the old membership goes silently — the roster
            // broadcast below carries the authoritative member list. When the
            // prior connection sat in a different room, that room's members
            // are told about the departure.
            let evicted = state
                .identities
                .resolve_connection(&identity)
                .filter(|prior| *prior != conn_id);
            if let Some(prior) = evicted {
                if let Some((prior_identity, prior_room)) =
                    state.identities.resolve_identity(&prior)
                {
                    let outcome = state.registry.remove_member(&prior_room, &prior);
                    if outcome.removed && prior_room != room_code {
                        let remaining = state
                            .registry
                            .get(&prior_room)
                            .map(|room| room.roster())
                            .unwrap_or_default();
                        departures.push((prior, prior_identity, remaining));
                    }
                }
            }

            state
                .identities
                .bind(conn_id, identity.clone(), room_code.clone(), now);

            state.registry.get_or_create(&room_code, now);
            let admitted = state
                .registry
                .add_member(&room_code, Participant::new(conn_id, identity.clone(), now))
                .map(|()| {
                    state
                        .registry
                        .get(&room_code)
                        .map(|room| room.roster())
                        .unwrap_or_default()
                });
            (evicted, departures, admitted)
        };

        if let Some(prior) = evicted {
            self.pusher.terminate(&prior).await;
        }

        // Rooms left behind by this join learn of the departure the same
        // way a finalized disconnect reports one.
        for (gone_conn, gone_identity, remaining) in &departures {
            let targets: Vec<ConnId> = remaining.iter().map(|p| p.conn_id).collect();
            let left_event = ServerEvent::UserLeft {
                conn_id: gone_conn.to_string(),
                identity: gone_identity.as_str().to_string(),
            };
            self.pusher.broadcast(&targets, &left_event.to_json()).await;

            let update_event = ServerEvent::ParticipantsUpdate {
                count: remaining.len(),
                participants: remaining.iter().map(ParticipantDto::from).collect(),
            };
            self.pusher
                .broadcast(&targets, &update_event.to_json())
                .await;
        }

        let roster = match admitted {
            Ok(roster) => roster,
            Err(err) => {
                tracing::warn!(
                    "Connection '{}' rejected from room '{}': {}",
                    conn_id,
                    room_code,
                    err
                );
                return Err(err);
            }
        };

        let peers: Vec<ParticipantDto> = roster
            .iter()
            .filter(|p| p.conn_id != conn_id)
            .map(ParticipantDto::from)
            .collect();
        let peer_conn_ids: Vec<ConnId> = roster
            .iter()
            .map(|p| p.conn_id)
            .filter(|c| *c != conn_id)
            .collect();
        let all_conn_ids: Vec<ConnId> = roster.iter().map(|p| p.conn_id).collect();

        // 1. The joiner's own peer list, so it can prepare to receive offers.
        let participants_event = ServerEvent::RoomParticipants { participants: peers };
        if let Err(e) = self
            .pusher
            .push_to(&conn_id, &participants_event.to_json())
            .await
        {
            tracing::warn!("Failed to send room participants to '{}': {}", conn_id, e);
        }

        // 2. Tell the existing members about the joiner.
        let joined_event = ServerEvent::UserJoined {
            conn_id: conn_id.to_string(),
            identity: identity.as_str().to_string(),
        };
        self.pusher
            .broadcast(&peer_conn_ids, &joined_event.to_json())
            .await;

        // 3. Authoritative roster for everyone, joiner included.
        let update_event = ServerEvent::ParticipantsUpdate {
            count: roster.len(),
            participants: roster.iter().map(ParticipantDto::from).collect(),
        };
        self.pusher
            .broadcast(&all_conn_ids, &update_event.to_json())
            .await;

        tracing::info!(
            "'{}' joined room '{}' on connection '{}' ({} members)",
            identity,
            room_code,
            conn_id,
            roster.len()
        );

        Ok(())
    }
}
