//! Shared utilities for the Huddle workspace.
//!
//! Cross-cutting concerns used by the server (and any future tooling):
//! logging setup and time helpers.

pub mod logger;
pub mod time;
