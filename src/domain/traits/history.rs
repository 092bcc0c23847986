use async_trait::async_trait;

use crate::application::errors::HistoryError;
use crate::domain::entities::ChatMessage;

/// HistoryStore trait - abstraction for the server-side message history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch stored messages, oldest first
    async fn fetch(&self) -> Result<Vec<ChatMessage>, HistoryError>;

    /// Ask the server to drop its history. `Ok(false)` means the server refused.
    async fn clear(&self) -> Result<bool, HistoryError>;
}
