//! Huddle session coordinator.
//!
//! Tracks which participants are present in which rooms, relays WebRTC
//! call-setup signaling between specific peers, fans out chat and presence
//! events room-wide, and keeps participants through transient disconnects
//! via a reconnection grace period.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
