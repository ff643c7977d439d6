//! Shared helpers for usecase tests.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::domain::{PusherFrame, RoomRegistry};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::message_pusher::WebSocketMessagePusher;

use super::{SharedState, SignalingState};

/// Fresh coordinator state with rooms capped at `room_capacity`, plus a
/// real channel-backed pusher to observe deliveries.
pub fn setup(room_capacity: usize) -> (SharedState, Arc<WebSocketMessagePusher>) {
    let state = SignalingState {
        registry: RoomRegistry::with_limits(room_capacity, 100),
        identities: Default::default(),
    };
    (
        Arc::new(Mutex::new(state)),
        Arc::new(WebSocketMessagePusher::new()),
    )
}

/// Pull every queued event frame off a connection's channel.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<PusherFrame>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        if let PusherFrame::Event(json) = frame {
            events.push(serde_json::from_str(&json).expect("valid server event"));
        }
    }
    events
}
