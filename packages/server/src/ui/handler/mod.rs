//! HTTP and WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{get_room_detail, get_rooms, get_stats, health_check, join_check, upload_recording};
pub use websocket::websocket_handler;
