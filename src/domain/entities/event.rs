use serde::Deserialize;
use serde_json::{json, Value};

use super::ChatMessage;

/// Events delivered by the chat server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Connected,
    Disconnected(String),
    ConnectError(String),
    UserCount { count: u32 },
    UserJoined { username: String },
    UserLeft { username: String },
    UserChangedName { old_username: String, new_username: String },
    ChatMessage(ChatMessage),
    Typing { username: String },
    /// An event name this client does not handle
    Unknown(String),
}

#[derive(Deserialize)]
struct CountPayload {
    count: u32,
}

#[derive(Deserialize)]
struct UsernamePayload {
    username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenamePayload {
    old_username: String,
    new_username: String,
}

impl ServerEvent {
    /// Build an event from its wire name and JSON payload
    pub fn from_wire(name: &str, data: Value) -> Result<Self, serde_json::Error> {
        let event = match name {
            "user_count" => {
                let p: CountPayload = serde_json::from_value(data)?;
                ServerEvent::UserCount { count: p.count }
            }
            "user_joined" => {
                let p: UsernamePayload = serde_json::from_value(data)?;
                ServerEvent::UserJoined { username: p.username }
            }
            "user_left" => {
                let p: UsernamePayload = serde_json::from_value(data)?;
                ServerEvent::UserLeft { username: p.username }
            }
            "user_changed_name" => {
                let p: RenamePayload = serde_json::from_value(data)?;
                ServerEvent::UserChangedName {
                    old_username: p.old_username,
                    new_username: p.new_username,
                }
            }
            "chat_message" => ServerEvent::ChatMessage(serde_json::from_value(data)?),
            "typing" => {
                let p: UsernamePayload = serde_json::from_value(data)?;
                ServerEvent::Typing { username: p.username }
            }
            other => ServerEvent::Unknown(other.to_string()),
        };
        Ok(event)
    }
}

/// Events this client sends to the chat server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Join { username: String },
    ChangeUsername { old_username: String, new_username: String },
    SendMessage { content: String, username: String, timestamp: String },
    Typing { username: String },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::ChangeUsername { .. } => "change_username",
            ClientEvent::SendMessage { .. } => "send_message",
            ClientEvent::Typing { .. } => "typing",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ClientEvent::Join { username } | ClientEvent::Typing { username } => {
                json!({ "username": username })
            }
            ClientEvent::ChangeUsername { old_username, new_username } => {
                json!({ "oldUsername": old_username, "newUsername": new_username })
            }
            ClientEvent::SendMessage { content, username, timestamp } => {
                json!({ "content": content, "username": username, "timestamp": timestamp })
            }
        }
    }
}
