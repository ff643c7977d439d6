//! UseCase: point-to-point private messages.
//!
//! The message is delivered to the recipient and echoed back to the sender
//! as a delivery confirmation — the sender receives its own message again
//! with the server-assigned id and timestamp. Private messages are not
//! appended to the room history.

use std::sync::Arc;

use huddle_shared::time::now_utc_millis;

use crate::domain::{
    ConnId, Identity, MessagePusher, SignalingError, StoredMessage, Timestamp,
};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::SharedState;

pub struct SendPrivateMessageUseCase {
    state: SharedState,
    pusher: Arc<dyn MessagePusher>,
}

impl SendPrivateMessageUseCase {
    pub fn new(state: SharedState, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { state, pusher }
    }

    pub async fn execute(
        &self,
        from_conn: ConnId,
        body: String,
        recipient: &str,
    ) -> Result<(), SignalingError> {
        let recipient = Identity::new(recipient)?;
        let now = Timestamp::new(now_utc_millis());

        let (message, recipient_conn) = {
            let state = self.state.lock().await;

            let (sender_identity, _room_code) = state
                .identities
                .resolve_identity(&from_conn)
                .ok_or_else(|| {
                    SignalingError::Internal("connection has not joined a room".to_string())
                })?;

            let recipient_conn = state
                .identities
                .resolve_connection(&recipient)
                .ok_or_else(|| {
                    SignalingError::RecipientOffline(recipient.as_str().to_string())
                })?;

            let message =
                StoredMessage::private(body, sender_identity, recipient.clone(), now);
            (message, recipient_conn)
        };

        let event = ServerEvent::PrivateMessage {
            message: message.into(),
        };
        let json = event.to_json();

        if let Err(e) = self.pusher.push_to(&recipient_conn, &json).await {
            tracing::warn!(
                "Failed to deliver private message to '{}': {}",
                recipient_conn,
                e
            );
        }
        // Echo back so the sender holds the authoritative record.
        if let Err(e) = self.pusher.push_to(&from_conn, &json).await {
            tracing::warn!("Failed to echo private message to '{}': {}", from_conn, e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::join_room::JoinRoomUseCase;
    use crate::usecase::test_support::{drain_events, setup};

    #[tokio::test]
    async fn test_private_message_is_delivered_and_echoed() {
        // given (precondition): alice and bob in a room
        let (state, pusher) = setup(10);
        let join = JoinRoomUseCase::new(state.clone(), pusher.clone());
        let (alice_tx, mut alice_rx) = tokio::sync::mpsc::unbounded_channel();
        let alice_conn = ConnId::generate();
        join.execute(alice_conn, "ABC123", "a@x.com", alice_tx)
            .await
            .unwrap();
        let (bob_tx, mut bob_rx) = tokio::sync::mpsc::unbounded_channel();
        join.execute(ConnId::generate(), "ABC123", "b@x.com", bob_tx)
            .await
            .unwrap();
        drain_events(&mut alice_rx);
        drain_events(&mut bob_rx);

        let private = SendPrivateMessageUseCase::new(state, pusher);

        // when (operation):
        private
            .execute(alice_conn, "just for you".to_string(), "b@x.com")
            .await
            .unwrap();

        // then (expected result): recipient got it, sender got the echo,
        // both carrying the same server-assigned id
        let bob_events = drain_events(&mut bob_rx);
        let alice_events = drain_events(&mut alice_rx);
        let (delivered, echoed) = match (&bob_events[0], &alice_events[0]) {
            (
                ServerEvent::PrivateMessage { message: d },
                ServerEvent::PrivateMessage { message: e },
            ) => (d.clone(), e.clone()),
            other => panic!("unexpected events: {other:?}"),
        };
        assert_eq!(delivered, echoed);
        assert_eq!(delivered.body, "just for you");
        assert_eq!(delivered.recipient.as_deref(), Some("b@x.com"));
    }

    #[tokio::test]
    async fn test_offline_recipient_fails_without_delivery() {
        // given (precondition): only alice is connected
        let (state, pusher) = setup(10);
        let join = JoinRoomUseCase::new(state.clone(), pusher.clone());
        let (alice_tx, mut alice_rx) = tokio::sync::mpsc::unbounded_channel();
        let alice_conn = ConnId::generate();
        join.execute(alice_conn, "ABC123", "a@x.com", alice_tx)
            .await
            .unwrap();
        drain_events(&mut alice_rx);

        let private = SendPrivateMessageUseCase::new(state, pusher);

        // when (operation):
        let result = private
            .execute(alice_conn, "hello?".to_string(), "c@x.com")
            .await;

        // then (expected result): RecipientOffline, and no echo either
        assert!(matches!(
            result,
            Err(SignalingError::RecipientOffline(ref who)) if who == "c@x.com"
        ));
        assert!(drain_events(&mut alice_rx).is_empty());
    }
}
