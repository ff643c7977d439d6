//! UseCase: liveness keepalive.
//!
//! A `ping` from a bound connection refreshes the identity's last-activity
//! timestamp. The `pong` reply is sent by the handler on the connection's
//! own channel so that even not-yet-joined connections get one.

use huddle_shared::time::now_utc_millis;

use crate::domain::{ConnId, Timestamp};

use super::SharedState;

pub struct HeartbeatUseCase {
    state: SharedState,
}

impl HeartbeatUseCase {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub async fn execute(&self, conn_id: ConnId) {
        let mut state = self.state.lock().await;
        if let Some((identity, _)) = state.identities.resolve_identity(&conn_id) {
            state
                .identities
                .touch(&identity, Timestamp::new(now_utc_millis()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, RoomCode};
    use crate::usecase::test_support::setup;

    #[tokio::test]
    async fn test_ping_refreshes_last_activity() {
        // given (precondition): a bound connection with an old activity mark
        let (state, _) = setup(10);
        let conn = ConnId::generate();
        let identity = Identity::new("a@x.com").unwrap();
        {
            let mut state = state.lock().await;
            state.identities.bind(
                conn,
                identity.clone(),
                RoomCode::new("ABC123").unwrap(),
                Timestamp::new(1),
            );
        }

        let heartbeat = HeartbeatUseCase::new(state.clone());

        // when (operation):
        heartbeat.execute(conn).await;

        // then (expected result):
        let state = state.lock().await;
        let activity = state.identities.last_activity(&identity).unwrap();
        assert!(activity > Timestamp::new(1));
    }

    #[tokio::test]
    async fn test_ping_from_unjoined_connection_is_harmless() {
        // given (precondition):
        let (state, _) = setup(10);
        let heartbeat = HeartbeatUseCase::new(state.clone());

        // when (operation) / then (expected result): no panic, no state
        heartbeat.execute(ConnId::generate()).await;
        assert_eq!(state.lock().await.identities.bound_connections(), 0);
    }
}
