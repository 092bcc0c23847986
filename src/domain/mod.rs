//! Domain layer - Core chat model with no I/O
//!
//! This layer contains:
//! - Entities: Messages, events, the local session, timeline entries
//! - Traits: Abstractions for infrastructure (Transport, HistoryStore, Clipboard)

pub mod entities;
pub mod traits;
