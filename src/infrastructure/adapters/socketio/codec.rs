//! Engine.IO v4 / Socket.IO v5 text framing
//!
//! Each websocket text frame is one Engine.IO packet: a type digit followed by
//! its payload. Engine.IO `message` packets carry a Socket.IO packet: type
//! digit, optional `/namespace,`, optional ack id, then JSON.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::errors::TransportError;

/// Engine.IO open handshake payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// Socket.IO packet for the default namespace
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event {
        name: String,
        data: Value,
        ack: Option<u64>,
    },
    Ack {
        id: u64,
        data: Value,
    },
    ConnectError(Value),
}

/// Decode one websocket text frame
pub fn decode_frame(frame: &str) -> Result<EnginePacket, TransportError> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| TransportError::Protocol("empty frame".to_string()))?;
    let payload = chars.as_str();

    let packet = match kind {
        '0' => {
            let handshake: Handshake = serde_json::from_str(payload)
                .map_err(|e| TransportError::Handshake(e.to_string()))?;
            EnginePacket::Open(handshake)
        }
        '1' => EnginePacket::Close,
        '2' => EnginePacket::Ping(payload.to_string()),
        '3' => EnginePacket::Pong(payload.to_string()),
        '4' => EnginePacket::Message(decode_socket_packet(payload)?),
        '5' => EnginePacket::Upgrade,
        '6' => EnginePacket::Noop,
        other => {
            return Err(TransportError::Protocol(format!(
                "unknown engine packet type {:?}",
                other
            )))
        }
    };
    Ok(packet)
}

fn decode_socket_packet(packet: &str) -> Result<SocketPacket, TransportError> {
    let mut chars = packet.chars();
    let kind = chars
        .next()
        .ok_or_else(|| TransportError::Protocol("empty socket packet".to_string()))?;
    let mut rest = chars.as_str();

    // Namespace, only present for non-default namespaces
    if rest.starts_with('/') {
        rest = match rest.find(',') {
            Some(comma) => &rest[comma + 1..],
            None => "",
        };
    }

    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let ack = rest[..digits].parse::<u64>().ok();
    rest = &rest[digits..];

    let data: Option<Value> = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str(rest).map_err(|e| TransportError::Protocol(e.to_string()))?)
    };

    let packet = match kind {
        '0' => SocketPacket::Connect(data),
        '1' => SocketPacket::Disconnect,
        '2' => {
            let (name, data) = split_event(data)?;
            SocketPacket::Event { name, data, ack }
        }
        '3' => SocketPacket::Ack {
            id: ack.ok_or_else(|| TransportError::Protocol("ack without id".to_string()))?,
            data: data.unwrap_or(Value::Null),
        },
        '4' => SocketPacket::ConnectError(data.unwrap_or(Value::Null)),
        '5' | '6' => {
            return Err(TransportError::Protocol(
                "binary packets are not supported".to_string(),
            ))
        }
        other => {
            return Err(TransportError::Protocol(format!(
                "unknown socket packet type {:?}",
                other
            )))
        }
    };
    Ok(packet)
}

/// `["name", arg, ...]` → (name, first arg)
fn split_event(data: Option<Value>) -> Result<(String, Value), TransportError> {
    let Some(Value::Array(mut items)) = data else {
        return Err(TransportError::Protocol("event payload is not an array".to_string()));
    };
    if items.is_empty() {
        return Err(TransportError::Protocol("event without a name".to_string()));
    }
    let name = match items.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(TransportError::Protocol(format!(
                "event name is not a string: {}",
                other
            )))
        }
    };
    let data = if items.is_empty() {
        Value::Null
    } else {
        items.remove(0)
    };
    Ok((name, data))
}

/// Join the default namespace
pub fn encode_connect() -> String {
    "40".to_string()
}

/// Leave the default namespace
pub fn encode_disconnect() -> String {
    "41".to_string()
}

/// Reply to a server ping, echoing its payload
pub fn encode_pong(payload: &str) -> String {
    format!("3{}", payload)
}

/// Emit an event on the default namespace
pub fn encode_event(name: &str, data: &Value) -> Result<String, TransportError> {
    Ok(format!("42{}", serde_json::to_string(&json!([name, data]))?))
}

/// Human-readable reason from a `connect_error` payload
pub fn connect_error_reason(data: &Value) -> String {
    data.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string())
}
