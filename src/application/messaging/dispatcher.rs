//! Event dispatcher - Routes server events to registered handlers

use std::sync::Arc;

use crate::domain::entities::{ChatMessage, ConnectionState, PresenceChange, ServerEvent};

/// Handler for incoming chat messages
pub type MessageHandler = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

/// Handler for joins, leaves, renames and the online count
pub type PresenceHandler = Arc<dyn Fn(&PresenceChange) + Send + Sync>;

/// Handler for "someone is typing" notifications, given the sender
pub type TypingHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Handler for connectivity changes
pub type ConnectionHandler = Arc<dyn Fn(&ConnectionState) + Send + Sync>;

/// Chat client event hub.
///
/// The UI subscribes to the kinds of event it cares about; the transport
/// feeds every decoded [`ServerEvent`] through [`ChatClient::dispatch`].
#[derive(Default, Clone)]
pub struct ChatClient {
    message_handlers: Vec<MessageHandler>,
    presence_handlers: Vec<PresenceHandler>,
    typing_handlers: Vec<TypingHandler>,
    connection_handlers: Vec<ConnectionHandler>,
}

impl ChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_message<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.message_handlers.push(Arc::new(handler));
        self
    }

    pub fn on_presence_change<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&PresenceChange) + Send + Sync + 'static,
    {
        self.presence_handlers.push(Arc::new(handler));
        self
    }

    pub fn on_typing_indicator<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.typing_handlers.push(Arc::new(handler));
        self
    }

    pub fn on_connection_state_change<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&ConnectionState) + Send + Sync + 'static,
    {
        self.connection_handlers.push(Arc::new(handler));
        self
    }

    /// Route one server event to every handler of its kind
    pub fn dispatch(&self, event: ServerEvent) {
        match event {
            ServerEvent::Connected => self.connection(ConnectionState::Connected),
            ServerEvent::Disconnected(reason) => {
                self.connection(ConnectionState::Disconnected(reason))
            }
            ServerEvent::ConnectError(reason) => self.connection(ConnectionState::Failed(reason)),
            ServerEvent::UserCount { count } => self.presence(PresenceChange::UserCount(count)),
            ServerEvent::UserJoined { username } => self.presence(PresenceChange::Joined(username)),
            ServerEvent::UserLeft { username } => self.presence(PresenceChange::Left(username)),
            ServerEvent::UserChangedName {
                old_username,
                new_username,
            } => self.presence(PresenceChange::Renamed {
                old: old_username,
                new: new_username,
            }),
            ServerEvent::ChatMessage(message) => {
                for handler in &self.message_handlers {
                    handler(&message);
                }
            }
            ServerEvent::Typing { username } => {
                for handler in &self.typing_handlers {
                    handler(&username);
                }
            }
            ServerEvent::Unknown(name) => {
                tracing::debug!("Ignoring unhandled server event: {}", name);
            }
        }
    }

    fn connection(&self, state: ConnectionState) {
        for handler in &self.connection_handlers {
            handler(&state);
        }
    }

    fn presence(&self, change: PresenceChange) {
        for handler in &self.presence_handlers {
            handler(&change);
        }
    }
}
