//! Application layer errors

use thiserror::Error;

/// General chat client errors
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Realtime connection errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Connection closed")]
    Closed,
}

/// History endpoint errors
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Clipboard errors
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Payload is not valid UTF-8 after decoding")]
    Decode,

    #[error("OSC 52 clipboard failed: {0}")]
    Osc52(String),

    #[error("System clipboard failed: {0}")]
    System(String),
}

/// Message formatting errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Markdown renderer panicked: {0}")]
    Renderer(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
