use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as it travels over the wire and is kept in history
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub username: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            timestamp: None,
            id: None,
        }
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
        self
    }

    /// Parsed send time, if the sender supplied a valid RFC 3339 timestamp
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Emoji offered by the picker
pub const EMOJIS: [&str; 8] = ["😊", "😂", "😍", "👍", "❤️", "😉", "🎉", "👋"];
