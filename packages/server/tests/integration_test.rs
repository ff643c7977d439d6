//! End-to-end tests running the coordinator in-process on an ephemeral
//! port, with real WebSocket and HTTP clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};

use huddle_server::{
    domain::RoomRegistry,
    infrastructure::{
        dto::websocket::ServerEvent, message_pusher::WebSocketMessagePusher,
        recording::RecordingStore,
    },
    ui::{Server, state::AppState},
    usecase::{
        DisconnectUseCase, EnsureRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        GetStatsUseCase, HeartbeatUseCase, JoinRoomUseCase, PresenceUseCase, RelaySignalUseCase,
        SendMessageUseCase, SendPrivateMessageUseCase, SharedState, SignalingState,
    },
};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const TEST_GRACE: Duration = Duration::from_millis(200);

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Wire up a full coordinator on an ephemeral port. Rooms are capped at
/// `room_capacity` and the disconnect grace is shortened for testing.
async fn spawn_coordinator(room_capacity: usize) -> SocketAddr {
    let mut signaling_state = SignalingState::new();
    signaling_state.registry = RoomRegistry::with_limits(room_capacity, 100);
    let state: SharedState = Arc::new(Mutex::new(signaling_state));

    let pusher = Arc::new(WebSocketMessagePusher::new());
    let recordings_dir = std::env::temp_dir().join(format!(
        "huddle-it-recordings-{}",
        uuid::Uuid::new_v4()
    ));

    let app_state = Arc::new(AppState {
        join_room_usecase: Arc::new(JoinRoomUseCase::new(state.clone(), pusher.clone())),
        disconnect_usecase: Arc::new(DisconnectUseCase::new(
            state.clone(),
            pusher.clone(),
            TEST_GRACE,
        )),
        heartbeat_usecase: Arc::new(HeartbeatUseCase::new(state.clone())),
        relay_signal_usecase: Arc::new(RelaySignalUseCase::new(state.clone(), pusher.clone())),
        send_message_usecase: Arc::new(SendMessageUseCase::new(state.clone(), pusher.clone())),
        send_private_message_usecase: Arc::new(SendPrivateMessageUseCase::new(
            state.clone(),
            pusher.clone(),
        )),
        presence_usecase: Arc::new(PresenceUseCase::new(state.clone(), pusher.clone())),
        get_rooms_usecase: Arc::new(GetRoomsUseCase::new(state.clone())),
        get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(state.clone())),
        ensure_room_usecase: Arc::new(EnsureRoomUseCase::new(state.clone())),
        get_stats_usecase: Arc::new(GetStatsUseCase::new(state.clone())),
        recording_store: Arc::new(RecordingStore::new(recordings_dir)),
    });

    let router = Server::new(app_state).router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect_ws(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws
}

async fn send_event(ws: &mut WsClient, event: serde_json::Value) {
    ws.send(WsMessage::Text(event.to_string().into()))
        .await
        .unwrap();
}

/// Receive the next JSON event, skipping WebSocket protocol frames.
async fn recv_event(ws: &mut WsClient) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("connection closed while waiting for an event")
            .unwrap();
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn join(ws: &mut WsClient, room_code: &str, identity: &str) {
    send_event(
        ws,
        serde_json::json!({"type": "join-room", "room_code": room_code, "identity": identity}),
    )
    .await;
}

#[tokio::test]
async fn test_health_endpoint_responds() {
    // given (precondition):
    let addr = spawn_coordinator(50).await;

    // when (operation):
    let response = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap();

    // then (expected result):
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_join_emits_events_in_protocol_order() {
    // given (precondition): alice alone in a room
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "ABC123", "alice@x.com").await;
    assert!(matches!(
        recv_event(&mut alice).await,
        ServerEvent::RoomParticipants { participants } if participants.is_empty()
    ));
    assert!(matches!(
        recv_event(&mut alice).await,
        ServerEvent::ParticipantsUpdate { count: 1, .. }
    ));

    // when (operation): bob joins
    let mut bob = connect_ws(addr).await;
    join(&mut bob, "ABC123", "bob@x.com").await;

    // then (expected result): bob first gets his peer list, then the roster
    match recv_event(&mut bob).await {
        ServerEvent::RoomParticipants { participants } => {
            assert_eq!(participants.len(), 1);
            assert_eq!(participants[0].identity, "alice@x.com");
        }
        other => panic!("unexpected first event for bob: {other:?}"),
    }
    assert!(matches!(
        recv_event(&mut bob).await,
        ServerEvent::ParticipantsUpdate { count: 2, .. }
    ));

    // and alice sees user-joined before the roster update
    assert!(matches!(
        recv_event(&mut alice).await,
        ServerEvent::UserJoined { identity, .. } if identity == "bob@x.com"
    ));
    assert!(matches!(
        recv_event(&mut alice).await,
        ServerEvent::ParticipantsUpdate { count: 2, .. }
    ));
}

#[tokio::test]
async fn test_offer_reaches_only_its_target() {
    // given (precondition): alice and bob in a room, knowing each other's
    // connection handles from the roster
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "CALL1", "alice@x.com").await;
    recv_event(&mut alice).await; // room-participants
    recv_event(&mut alice).await; // participants-update

    let mut bob = connect_ws(addr).await;
    join(&mut bob, "CALL1", "bob@x.com").await;
    let bob_peers = match recv_event(&mut bob).await {
        ServerEvent::RoomParticipants { participants } => participants,
        other => panic!("unexpected event: {other:?}"),
    };
    let alice_handle = bob_peers[0].conn_id.clone();
    recv_event(&mut bob).await; // participants-update
    recv_event(&mut alice).await; // user-joined
    recv_event(&mut alice).await; // participants-update

    // when (operation): bob sends alice an offer
    send_event(
        &mut bob,
        serde_json::json!({
            "type": "offer",
            "to": alice_handle,
            "payload": {"sdp": "v=0 fake"}
        }),
    )
    .await;

    // then (expected result): alice receives it stamped with bob's identity
    match recv_event(&mut alice).await {
        ServerEvent::Offer {
            payload,
            from_identity,
            ..
        } => {
            assert_eq!(payload["sdp"], "v=0 fake");
            assert_eq!(from_identity, "bob@x.com");
        }
        other => panic!("unexpected event for alice: {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_broadcast_includes_sender() {
    // given (precondition): alice and bob in a room
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "CHAT1", "alice@x.com").await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;
    let mut bob = connect_ws(addr).await;
    join(&mut bob, "CHAT1", "bob@x.com").await;
    recv_event(&mut bob).await;
    recv_event(&mut bob).await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    // when (operation): alice sends a chat message
    send_event(
        &mut alice,
        serde_json::json!({"type": "chat-message", "body": "hello room"}),
    )
    .await;

    // then (expected result): both see it with the same server-assigned id
    let to_bob = match recv_event(&mut bob).await {
        ServerEvent::ChatMessage { message } => message,
        other => panic!("unexpected event for bob: {other:?}"),
    };
    let to_alice = match recv_event(&mut alice).await {
        ServerEvent::ChatMessage { message } => message,
        other => panic!("unexpected event for alice: {other:?}"),
    };
    assert_eq!(to_bob, to_alice);
    assert_eq!(to_bob.body, "hello room");
    assert_eq!(to_bob.sender, "alice@x.com");
}

#[tokio::test]
async fn test_private_message_to_offline_recipient_reports_error() {
    // given (precondition): alice alone
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "SOLO1", "alice@x.com").await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    // when (operation): a private message to someone who never connected
    send_event(
        &mut alice,
        serde_json::json!({
            "type": "private-message",
            "body": "anyone there?",
            "recipient": "ghost@x.com"
        }),
    )
    .await;

    // then (expected result): an error event to alice only
    match recv_event(&mut alice).await {
        ServerEvent::Error { message } => assert!(message.contains("ghost@x.com")),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_join_full_room_reports_error_event() {
    // given (precondition): a room capped at one member
    let addr = spawn_coordinator(1).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "TINY1", "alice@x.com").await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    // when (operation): bob tries to join
    let mut bob = connect_ws(addr).await;
    join(&mut bob, "TINY1", "bob@x.com").await;

    // then (expected result): bob gets the room-full error
    match recv_event(&mut bob).await {
        ServerEvent::Error { message } => assert!(message.contains("full")),
        other => panic!("unexpected event for bob: {other:?}"),
    }
}

#[tokio::test]
async fn test_departure_is_announced_after_grace_period() {
    // given (precondition): alice and bob in a room
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "GRACE1", "alice@x.com").await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;
    let mut bob = connect_ws(addr).await;
    join(&mut bob, "GRACE1", "bob@x.com").await;
    recv_event(&mut bob).await;
    recv_event(&mut bob).await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    // when (operation): alice's transport drops and she stays away
    alice.close(None).await.unwrap();
    drop(alice);

    // then (expected result): after the grace period bob sees user-left
    // and the shrunken roster
    assert!(matches!(
        recv_event(&mut bob).await,
        ServerEvent::UserLeft { identity, .. } if identity == "alice@x.com"
    ));
    assert!(matches!(
        recv_event(&mut bob).await,
        ServerEvent::ParticipantsUpdate { count: 1, .. }
    ));
}

#[tokio::test]
async fn test_reconnect_within_grace_period_stays_silent() {
    // given (precondition): alice and bob in a room
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "GRACE2", "alice@x.com").await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;
    let mut bob = connect_ws(addr).await;
    join(&mut bob, "GRACE2", "bob@x.com").await;
    recv_event(&mut bob).await;
    recv_event(&mut bob).await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    // when (operation): alice drops and rejoins inside the grace window
    alice.close(None).await.unwrap();
    drop(alice);
    let mut alice2 = connect_ws(addr).await;
    join(&mut alice2, "GRACE2", "alice@x.com").await;
    recv_event(&mut alice2).await;
    recv_event(&mut alice2).await;
    tokio::time::sleep(TEST_GRACE * 4).await;

    // then (expected result): bob never saw user-left; the rejoin shows up
    // as user-joined plus a roster still holding two members
    assert!(matches!(
        recv_event(&mut bob).await,
        ServerEvent::UserJoined { identity, .. } if identity == "alice@x.com"
    ));
    assert!(matches!(
        recv_event(&mut bob).await,
        ServerEvent::ParticipantsUpdate { count: 2, .. }
    ));
    // No further events pending for bob.
    let extra = tokio::time::timeout(Duration::from_millis(200), bob.next()).await;
    assert!(extra.is_err(), "bob received an unexpected event: {extra:?}");
}

#[tokio::test]
async fn test_ping_earns_a_pong_before_joining() {
    // given (precondition): a connection that never joined a room
    let addr = spawn_coordinator(50).await;
    let mut ws = connect_ws(addr).await;

    // when (operation):
    send_event(&mut ws, serde_json::json!({"type": "ping"})).await;

    // then (expected result):
    assert!(matches!(recv_event(&mut ws).await, ServerEvent::Pong));
}

#[tokio::test]
async fn test_join_check_and_stats_over_http() {
    // given (precondition): one occupied room
    let addr = spawn_coordinator(50).await;
    let mut alice = connect_ws(addr).await;
    join(&mut alice, "HTTP01", "alice@x.com").await;
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    let client = reqwest::Client::new();

    // when (operation): the pre-join check for the same room
    let check: serde_json::Value = client
        .post(format!("http://{addr}/api/rooms/http01"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (expected result): normalized code and live occupancy
    assert_eq!(check["code"], "HTTP01");
    assert_eq!(check["participant_count"], 1);

    // and the room listing and stats agree
    let rooms: serde_json::Value = client
        .get(format!("http://{addr}/api/rooms"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["code"], "HTTP01");

    let stats: serde_json::Value = client
        .get(format!("http://{addr}/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["active_rooms"], 1);
    assert_eq!(stats["connections"], 1);
}

#[tokio::test]
async fn test_room_detail_for_unknown_room_is_404() {
    // given (precondition):
    let addr = spawn_coordinator(50).await;

    // when (operation):
    let response = reqwest::get(format!("http://{addr}/api/rooms/NOSUCH"))
        .await
        .unwrap();

    // then (expected result):
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recording_upload_returns_metadata() {
    // given (precondition):
    let addr = spawn_coordinator(50).await;
    let client = reqwest::Client::new();

    // when (operation):
    let response = client
        .post(format!(
            "http://{addr}/api/rooms/REC001/recordings?uploader=alice@x.com&duration_secs=12"
        ))
        .body(b"webm-bytes-here".to_vec())
        .send()
        .await
        .unwrap();

    // then (expected result): created, with the metadata echoed back
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let metadata: serde_json::Value = response.json().await.unwrap();
    assert_eq!(metadata["room_code"], "REC001");
    assert_eq!(metadata["uploader"], "alice@x.com");
    assert_eq!(metadata["duration_secs"], 12);
    assert_eq!(metadata["size_bytes"], 15);
}
