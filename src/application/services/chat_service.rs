use std::time::Instant;

use chrono::{DateTime, Local, Utc};

use crate::application::errors::ChatError;
use crate::application::formatting::MessageFormatter;
use crate::application::messaging::TypingThrottle;
use crate::domain::entities::{
    ChatMessage, ClientEvent, PresenceChange, RenderedMessage, Session, TimelineEntry,
};
use crate::domain::traits::{HistoryStore, Transport};

/// Shown when the server has no history yet
pub const WELCOME_MESSAGE: &str = "Welcome to the chat room!";

/// Shown when the history request fails
pub const HISTORY_ERROR_MESSAGE: &str = "Could not load the message history";

/// Application controller: owns the session and talks to the server
pub struct ChatService<T: Transport, H: HistoryStore> {
    transport: T,
    history: H,
    session: Session,
    formatter: MessageFormatter,
    throttle: TypingThrottle,
}

impl<T: Transport, H: HistoryStore> ChatService<T, H> {
    pub fn new(transport: T, history: H, session: Session, formatter: MessageFormatter) -> Self {
        Self {
            transport,
            history,
            session,
            formatter,
            throttle: TypingThrottle::default(),
        }
    }

    pub fn with_throttle(mut self, throttle: TypingThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Announce ourselves; sent on every (re)connect
    pub async fn join(&self) -> Result<(), ChatError> {
        tracing::info!("Joining as {}", self.session);
        self.transport
            .emit(ClientEvent::Join {
                username: self.session.display_name().to_string(),
            })
            .await?;
        Ok(())
    }

    /// Send a chat message and return it rendered for our own view.
    /// Blank input sends nothing and returns `None`.
    pub async fn send_message(&self, raw: &str) -> Result<Option<TimelineEntry>, ChatError> {
        let content = raw.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let message =
            ChatMessage::new(self.session.display_name(), content).with_timestamp(Utc::now());
        self.transport
            .emit(ClientEvent::SendMessage {
                content: message.content.clone(),
                username: message.username.clone(),
                timestamp: message.timestamp.clone().unwrap_or_default(),
            })
            .await?;

        Ok(Some(self.render_incoming(&message)))
    }

    /// Change our display name. Blank or unchanged names are ignored.
    pub async fn rename(&mut self, new_name: &str) -> Result<Option<PresenceChange>, ChatError> {
        let new_name = new_name.trim();
        if new_name.is_empty() || self.session.is_me(new_name) {
            return Ok(None);
        }

        self.transport
            .emit(ClientEvent::ChangeUsername {
                old_username: self.session.display_name().to_string(),
                new_username: new_name.to_string(),
            })
            .await?;

        Ok(self.session.rename(new_name).map(|old| {
            tracing::info!("Renamed {} -> {}", old, new_name);
            PresenceChange::Renamed {
                old,
                new: new_name.to_string(),
            }
        }))
    }

    /// Tell others we are typing, at most once per throttle window.
    /// Returns whether a notification went out.
    pub async fn notify_typing(&mut self, now: Instant) -> Result<bool, ChatError> {
        if !self.throttle.should_emit(now) {
            return Ok(false);
        }
        self.transport
            .emit(ClientEvent::Typing {
                username: self.session.display_name().to_string(),
            })
            .await?;
        Ok(true)
    }

    /// Format a message for display
    pub fn render_incoming(&self, message: &ChatMessage) -> TimelineEntry {
        let sent_at = message.sent_at().unwrap_or_else(Utc::now);
        TimelineEntry::Message(RenderedMessage {
            sender: message.username.clone(),
            is_me: self.session.is_me(&message.username),
            raw: message.content.trim().to_string(),
            markup: self.formatter.format(&message.content),
            time: local_time(sent_at),
        })
    }

    /// Load the conversation so far. Never fails: an empty history yields a
    /// welcome line and a failed request an error line.
    pub async fn load_history(&self) -> Vec<TimelineEntry> {
        match self.history.fetch().await {
            Ok(messages) if messages.is_empty() => vec![TimelineEntry::system(WELCOME_MESSAGE)],
            Ok(messages) => {
                tracing::debug!("Loaded {} history messages", messages.len());
                messages
                    .iter()
                    .filter(|m| !m.content.trim().is_empty())
                    .map(|m| self.render_incoming(m))
                    .collect()
            }
            Err(e) => {
                tracing::warn!("Failed to load history: {}", e);
                vec![TimelineEntry::system(HISTORY_ERROR_MESSAGE)]
            }
        }
    }

    /// Ask the server to clear its history. `Ok(false)` when it refused.
    pub async fn clear_history(&self) -> Result<bool, ChatError> {
        let cleared = self.history.clear().await?;
        if cleared {
            tracing::info!("Server history cleared");
        } else {
            tracing::warn!("Server refused to clear history");
        }
        Ok(cleared)
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
