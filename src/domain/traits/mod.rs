//! Domain traits - Abstractions for infrastructure implementations

pub mod clipboard;
pub mod history;
pub mod transport;

pub use clipboard::Clipboard;
pub use history::HistoryStore;
pub use transport::Transport;
