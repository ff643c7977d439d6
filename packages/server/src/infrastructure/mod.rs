//! Infrastructure layer: concrete delivery, wire DTOs, and file storage.

pub mod dto;
pub mod message_pusher;
pub mod recording;
