//! Adapters - The chat server connection and the terminal front end

pub mod console;
pub mod socketio;

pub use console::ConsoleAdapter;
pub use socketio::SocketIoTransport;
