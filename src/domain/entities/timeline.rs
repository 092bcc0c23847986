use super::RenderableMarkup;

/// Connectivity as shown in the status banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected(String),
    Failed(String),
}

impl ConnectionState {
    pub fn banner(&self) -> String {
        match self {
            ConnectionState::Connecting => "Connecting…".to_string(),
            ConnectionState::Connected => "Connected".to_string(),
            ConnectionState::Disconnected(reason) => format!("Connection lost ({})", reason),
            ConnectionState::Failed(reason) => format!("Connection error ({})", reason),
        }
    }

    /// Error banners stay up; the connected banner fades after a few seconds
    pub fn is_error(&self) -> bool {
        matches!(self, ConnectionState::Disconnected(_) | ConnectionState::Failed(_))
    }
}

/// Presence notifications from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    UserCount(u32),
    Joined(String),
    Left(String),
    Renamed { old: String, new: String },
}

impl PresenceChange {
    /// Line shown in the conversation. The online count only updates a counter.
    pub fn system_text(&self) -> Option<String> {
        match self {
            PresenceChange::UserCount(_) => None,
            PresenceChange::Joined(user) => Some(format!("{} joined the chat", user)),
            PresenceChange::Left(user) => Some(format!("{} left the chat", user)),
            PresenceChange::Renamed { old, new } => {
                Some(format!("{} changed their name to {}", old, new))
            }
        }
    }
}

/// A chat message ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub sender: String,
    pub is_me: bool,
    pub raw: String,
    pub markup: RenderableMarkup,
    /// Local `HH:MM`
    pub time: String,
}

/// One entry in the conversation view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    Message(RenderedMessage),
    System(String),
}

impl TimelineEntry {
    pub fn system(text: impl Into<String>) -> Self {
        TimelineEntry::System(text.into())
    }

    pub fn as_message(&self) -> Option<&RenderedMessage> {
        match self {
            TimelineEntry::Message(msg) => Some(msg),
            TimelineEntry::System(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_lines() {
        assert_eq!(PresenceChange::UserCount(3).system_text(), None);
        assert_eq!(
            PresenceChange::Joined("amy".into()).system_text().as_deref(),
            Some("amy joined the chat")
        );
        assert_eq!(
            PresenceChange::Renamed { old: "a".into(), new: "b".into() }
                .system_text()
                .as_deref(),
            Some("a changed their name to b")
        );
    }

    #[test]
    fn test_error_banners() {
        assert!(!ConnectionState::Connected.is_error());
        assert!(!ConnectionState::Connecting.is_error());
        assert!(ConnectionState::Failed("refused".into()).is_error());
        assert!(ConnectionState::Disconnected("bye".into()).banner().contains("bye"));
    }
}
