//! Application layer - Use cases and chat logic
//!
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Formatting: Markdown to sanitized markup
//! - Messaging: Input parsing, event dispatch, typing indicators
//! - Services: The chat controller and copy actions
//! - View: HTML fragments and terminal lines for timeline entries

pub mod errors;
pub mod formatting;
pub mod messaging;
pub mod services;
pub mod view;
