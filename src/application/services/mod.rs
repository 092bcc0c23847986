//! Application services - Chat orchestration and copy actions

pub mod chat_service;
pub mod copy_service;

pub use chat_service::ChatService;
pub use copy_service::{CopyOutcome, CopyService};
