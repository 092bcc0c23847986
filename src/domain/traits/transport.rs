use async_trait::async_trait;

use crate::application::errors::TransportError;
use crate::domain::entities::ClientEvent;

/// Transport trait - abstraction for the realtime connection to the chat server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an event to the server
    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError>;

    /// Whether the connection is still open
    fn is_connected(&self) -> bool;
}
