//! HTTP history adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::errors::HistoryError;
use crate::domain::entities::ChatMessage;
use crate::domain::traits::HistoryStore;

/// Status value the server returns when history was cleared
const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct ClearResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// History served by the chat server over HTTP
pub struct HttpHistory {
    client: Client,
    history_url: String,
    clear_url: String,
}

impl HttpHistory {
    pub fn new(history_url: impl Into<String>, clear_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            history_url: history_url.into(),
            clear_url: clear_url.into(),
        }
    }
}

#[async_trait]
impl HistoryStore for HttpHistory {
    async fn fetch(&self) -> Result<Vec<ChatMessage>, HistoryError> {
        let response = self
            .client
            .get(&self.history_url)
            .send()
            .await
            .map_err(|e| HistoryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HistoryError::Status(response.status().as_u16()));
        }

        // The server answers `null` before anything was ever said
        let messages: Option<Vec<ChatMessage>> = response
            .json()
            .await
            .map_err(|e| HistoryError::Parse(e.to_string()))?;

        Ok(messages.unwrap_or_default())
    }

    async fn clear(&self) -> Result<bool, HistoryError> {
        let response = self
            .client
            .post(&self.clear_url)
            .send()
            .await
            .map_err(|e| HistoryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HistoryError::Status(response.status().as_u16()));
        }

        let data: ClearResponse = response
            .json()
            .await
            .map_err(|e| HistoryError::Parse(e.to_string()))?;

        if let Some(message) = &data.message {
            tracing::debug!("clear_history: {} ({})", data.status, message);
        }
        Ok(data.status == STATUS_SUCCESS)
    }
}
