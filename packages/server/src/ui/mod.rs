//! WebRTC session coordinator server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
