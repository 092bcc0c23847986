//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Socket.IO connection, terminal front end
//! - History: HTTP history endpoints
//! - Clipboard: Terminal and desktop clipboard
//! - Transcript: HTML rendering of the conversation

pub mod adapters;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod transcript;
