//! linechat - terminal client for a Socket.IO chat room.
//!
//! Messages are rendered through a Markdown formatter into sanitized HTML,
//! with diagram and code blocks carrying copy controls.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::formatting::{format, MessageFormatter};
pub use domain::entities::RenderableMarkup;
