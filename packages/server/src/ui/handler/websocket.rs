//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnId, PusherChannel, PusherFrame, SignalingError},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::state::AppState,
    usecase::{PresenceKind, SignalKind},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The connection handle is server-assigned; clients never pick one.
    let conn_id = ConnId::generate();
    tracing::info!("Connection '{}' upgrading to WebSocket", conn_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, conn_id))
}

/// Spawns the outbound half: frames queued for this connection are written
/// to the socket in order. A terminate frame closes the socket, which is
/// how a superseded connection gets hung up.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PusherFrame>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                PusherFrame::Event(msg) => {
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                PusherFrame::Terminate => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

/// Report a failed operation to the originating connection only.
fn report_error(tx: &PusherChannel, err: &SignalingError) {
    let event = ServerEvent::Error {
        message: err.to_string(),
    };
    let _ = tx.send(PusherFrame::Event(event.to_json()));
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, conn_id: ConnId) {
    let (sender, mut receiver) = socket.split();

    // One ordered queue per connection; every event this connection will
    // ever see flows through it.
    let (tx, rx) = mpsc::unbounded_channel();

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let tx_clone = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", conn_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Malformed event from '{}': {}", conn_id, e);
                            report_error(
                                &tx_clone,
                                &SignalingError::Internal(format!("malformed event: {e}")),
                            );
                            continue;
                        }
                    };

                    if let Err(e) = dispatch(&state_clone, conn_id, &tx_clone, event).await {
                        tracing::warn!("Operation failed for '{}': {}", conn_id, e);
                        report_error(&tx_clone, &e);
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", conn_id);
                    break;
                }
                // Ping/pong at the WebSocket protocol level is handled by axum.
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // The transport is gone; membership survives until the grace-period
    // check decides otherwise.
    state.disconnect_usecase.schedule(conn_id);
}

async fn dispatch(
    state: &Arc<AppState>,
    conn_id: ConnId,
    tx: &PusherChannel,
    event: ClientEvent,
) -> Result<(), SignalingError> {
    match event {
        ClientEvent::JoinRoom {
            room_code,
            identity,
        } => {
            state
                .join_room_usecase
                .execute(conn_id, &room_code, &identity, tx.clone())
                .await
        }
        ClientEvent::Ping => {
            // Pong goes straight onto this connection's own queue so even
            // not-yet-joined connections get one.
            let _ = tx.send(PusherFrame::Event(ServerEvent::Pong.to_json()));
            state.heartbeat_usecase.execute(conn_id).await;
            Ok(())
        }
        ClientEvent::Offer { to, payload } => {
            state
                .relay_signal_usecase
                .execute(conn_id, &to, SignalKind::Offer, payload)
                .await
        }
        ClientEvent::Answer { to, payload } => {
            state
                .relay_signal_usecase
                .execute(conn_id, &to, SignalKind::Answer, payload)
                .await
        }
        ClientEvent::IceCandidate { to, payload } => {
            state
                .relay_signal_usecase
                .execute(conn_id, &to, SignalKind::IceCandidate, payload)
                .await
        }
        ClientEvent::ChatMessage { body } => {
            state.send_message_usecase.execute(conn_id, body).await
        }
        ClientEvent::PrivateMessage { body, recipient } => {
            state
                .send_private_message_usecase
                .execute(conn_id, body, &recipient)
                .await
        }
        ClientEvent::MediaStateChange { payload } => {
            state
                .presence_usecase
                .execute(conn_id, PresenceKind::MediaStateChange, payload)
                .await
        }
        ClientEvent::ScreenShareStart => {
            state
                .presence_usecase
                .execute(conn_id, PresenceKind::ScreenShareStart, serde_json::Value::Null)
                .await
        }
        ClientEvent::ScreenShareStop => {
            state
                .presence_usecase
                .execute(conn_id, PresenceKind::ScreenShareStop, serde_json::Value::Null)
                .await
        }
        ClientEvent::RecordingStarted => {
            state
                .presence_usecase
                .execute(conn_id, PresenceKind::RecordingStarted, serde_json::Value::Null)
                .await
        }
        ClientEvent::RecordingStopped => {
            state
                .presence_usecase
                .execute(conn_id, PresenceKind::RecordingStopped, serde_json::Value::Null)
                .await
        }
    }
}
