//! Data Transfer Objects, organized by protocol:
//! - `websocket`: real-time event types (tagged, kebab-case `type` field)
//! - `http`: REST response types

pub mod http;
pub mod websocket;
