//! WebRTC session coordinator.
//!
//! Maintains rooms of connected participants, relays call-setup signaling
//! between them, and fans out chat and presence events.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin huddle-server
//! cargo run --bin huddle-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use huddle_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, recording::RecordingStore},
    ui::{Server, state::AppState},
    usecase::{
        DISCONNECT_GRACE, DisconnectUseCase, EnsureRoomUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, GetStatsUseCase, HeartbeatUseCase, JoinRoomUseCase, PresenceUseCase,
        RelaySignalUseCase, SWEEP_INTERVAL, SendMessageUseCase, SendPrivateMessageUseCase,
        SweepRoomsUseCase, new_shared_state,
    },
};
use huddle_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "huddle-server")]
#[command(about = "WebRTC session coordinator", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Directory uploaded recordings are written to
    #[arg(long, default_value = "./recordings")]
    recordings_dir: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Coordinator state
    // 2. MessagePusher
    // 3. RecordingStore
    // 4. UseCases
    // 5. Server

    // 1. Create the shared coordinator state (room registry + identity map)
    let state = new_shared_state();

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create RecordingStore
    let recording_store = Arc::new(RecordingStore::new(&args.recordings_dir));

    // 4. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        state.clone(),
        message_pusher.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        state.clone(),
        message_pusher.clone(),
        DISCONNECT_GRACE,
    ));
    let heartbeat_usecase = Arc::new(HeartbeatUseCase::new(state.clone()));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(
        state.clone(),
        message_pusher.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        state.clone(),
        message_pusher.clone(),
    ));
    let send_private_message_usecase = Arc::new(SendPrivateMessageUseCase::new(
        state.clone(),
        message_pusher.clone(),
    ));
    let presence_usecase = Arc::new(PresenceUseCase::new(
        state.clone(),
        message_pusher.clone(),
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(state.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(state.clone()));
    let ensure_room_usecase = Arc::new(EnsureRoomUseCase::new(state.clone()));
    let get_stats_usecase = Arc::new(GetStatsUseCase::new(state.clone()));

    // Janitor: periodically drop rooms everyone has left
    let sweep_usecase = Arc::new(SweepRoomsUseCase::new(state.clone()));
    sweep_usecase.run_periodic(SWEEP_INTERVAL);

    // 5. Create and run the server
    let app_state = Arc::new(AppState {
        join_room_usecase,
        disconnect_usecase,
        heartbeat_usecase,
        relay_signal_usecase,
        send_message_usecase,
        send_private_message_usecase,
        presence_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        ensure_room_usecase,
        get_stats_usecase,
        recording_store,
    });
    let server = Server::new(app_state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
