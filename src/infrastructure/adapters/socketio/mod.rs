//! Socket.IO adapter - realtime connection to the chat server over websocket

pub mod codec;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use url::Url;

use self::codec::{EnginePacket, SocketPacket};
use crate::application::errors::TransportError;
use crate::domain::entities::{ClientEvent, ServerEvent};
use crate::domain::traits::Transport;

/// Engine.IO protocol revision spoken by this client
const ENGINE_IO_VERSION: &str = "4";

/// Websocket URL for a chat server base URL
/// (`http://host:5000` → `ws://host:5000/socket.io/?EIO=4&transport=websocket`)
pub fn socket_url(server_url: &str) -> Result<Url, TransportError> {
    let mut url =
        Url::parse(server_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", server_url, e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme {:?}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| TransportError::InvalidUrl(server_url.to_string()))?;
    url.set_path("/socket.io/");
    url.set_query(Some(&format!(
        "EIO={}&transport=websocket",
        ENGINE_IO_VERSION
    )));
    Ok(url)
}

/// How long `disconnect` waits for queued frames to reach the socket
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Work for the writer task
#[derive(Debug)]
enum Outbound {
    Frame(String),
    Shutdown,
}

/// Socket.IO client transport
pub struct SocketIoTransport {
    outgoing: mpsc::UnboundedSender<Outbound>,
    connected: Arc<AtomicBool>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl SocketIoTransport {
    /// Connect, complete the Engine.IO handshake and join the default
    /// namespace. Decoded server events arrive on the returned receiver; the
    /// last one is always [`ServerEvent::Disconnected`].
    pub async fn connect(
        server_url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), TransportError> {
        let url = socket_url(server_url)?;
        tracing::info!("Connecting to {}", url);

        let (ws, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let handshake = match next_text(&mut stream).await? {
            EnginePacket::Open(handshake) => handshake,
            other => {
                return Err(TransportError::Handshake(format!(
                    "expected open packet, got {:?}",
                    other
                )))
            }
        };
        tracing::debug!(
            sid = %handshake.sid,
            ping_interval = handshake.ping_interval,
            ping_timeout = handshake.ping_timeout,
            "Engine.IO session opened"
        );

        sink.send(WsMessage::Text(codec::encode_connect()))
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        // Writer: the only owner of the sink. Stops with the reader.
        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = out_rx.recv() => match command {
                        Some(Outbound::Frame(frame)) => {
                            if let Err(e) = sink.send(WsMessage::Text(frame)).await {
                                tracing::warn!("Websocket write failed: {}", e);
                                break;
                            }
                        }
                        Some(Outbound::Shutdown) | None => break,
                    },
                    _ = &mut stop_rx => break,
                }
            }
            let _ = sink.close().await;
        });

        // Reader: decodes frames, answers pings, reports the disconnect reason
        let silence = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);
        let pong_tx = out_tx.clone();
        let flag = connected.clone();
        tokio::spawn(async move {
            let reason = read_loop(stream, &pong_tx, &event_tx, silence).await;
            flag.store(false, Ordering::SeqCst);
            let _ = stop_tx.send(());
            tracing::info!("Disconnected: {}", reason);
            let _ = event_tx.send(ServerEvent::Disconnected(reason));
        });

        Ok((
            Self {
                outgoing: out_tx,
                connected,
                writer: Mutex::new(Some(writer)),
            },
            event_rx,
        ))
    }

    /// A transport that never connected: every emit fails with
    /// [`TransportError::Closed`] and the event stream is already finished
    pub fn offline() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (outgoing, _) = mpsc::unbounded_channel::<Outbound>();
        let (_, events) = mpsc::unbounded_channel::<ServerEvent>();
        (
            Self {
                outgoing,
                connected: Arc::new(AtomicBool::new(false)),
                writer: Mutex::new(None),
            },
            events,
        )
    }

    /// Leave the namespace and close the websocket. Returns once the
    /// disconnect frame and the close frame have been written.
    pub async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let _ = self
            .outgoing
            .send(Outbound::Frame(codec::encode_disconnect()));
        let _ = self.outgoing.send(Outbound::Shutdown);

        let writer = self.writer.lock().ok().and_then(|mut w| w.take());
        if let Some(writer) = writer {
            if tokio::time::timeout(FLUSH_TIMEOUT, writer).await.is_err() {
                tracing::warn!("Timed out flushing the websocket");
            }
        }
    }
}

#[async_trait]
impl Transport for SocketIoTransport {
    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        let frame = codec::encode_event(event.name(), &event.payload())?;
        tracing::debug!("emit {}", event.name());
        self.outgoing
            .send(Outbound::Frame(frame))
            .map_err(|_| TransportError::Closed)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

async fn next_text<S>(stream: &mut S) -> Result<EnginePacket, TransportError>
where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    loop {
        match stream.next().await {
            Some(Ok(WsMessage::Text(text))) => return codec::decode_frame(&text),
            Some(Ok(WsMessage::Close(_))) | None => return Err(TransportError::Closed),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(TransportError::Handshake(e.to_string())),
        }
    }
}

async fn read_loop<S>(
    mut stream: S,
    outgoing: &mpsc::UnboundedSender<Outbound>,
    events: &mpsc::UnboundedSender<ServerEvent>,
    silence: Duration,
) -> String
where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    loop {
        let message = match tokio::time::timeout(silence, stream.next()).await {
            Err(_) => return "ping timeout".to_string(),
            Ok(None) => return "transport close".to_string(),
            Ok(Some(Err(e))) => return format!("transport error: {}", e),
            Ok(Some(Ok(message))) => message,
        };

        let text = match message {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => return "server closed the connection".to_string(),
            _ => continue,
        };

        let packet = match codec::decode_frame(&text) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Dropping undecodable frame: {}", e);
                continue;
            }
        };

        let event = match packet {
            EnginePacket::Ping(payload) => {
                if outgoing
                    .send(Outbound::Frame(codec::encode_pong(&payload)))
                    .is_err()
                {
                    return "writer stopped".to_string();
                }
                continue;
            }
            EnginePacket::Close => return "server closed the session".to_string(),
            EnginePacket::Message(SocketPacket::Connect(_)) => ServerEvent::Connected,
            EnginePacket::Message(SocketPacket::Disconnect) => {
                return "io server disconnect".to_string()
            }
            EnginePacket::Message(SocketPacket::ConnectError(data)) => {
                ServerEvent::ConnectError(codec::connect_error_reason(&data))
            }
            EnginePacket::Message(SocketPacket::Event { name, data, .. }) => {
                match ServerEvent::from_wire(&name, data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Malformed {} payload: {}", name, e);
                        continue;
                    }
                }
            }
            EnginePacket::Message(SocketPacket::Ack { .. })
            | EnginePacket::Open(_)
            | EnginePacket::Pong(_)
            | EnginePacket::Upgrade
            | EnginePacket::Noop => continue,
        };

        if events.send(event).is_err() {
            return "client dropped".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_url() {
        assert_eq!(
            socket_url("http://localhost:5000").unwrap().as_str(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("https://chat.example.com/some/page").unwrap().as_str(),
            "wss://chat.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn test_socket_url_rejects_other_schemes() {
        assert!(matches!(
            socket_url("ftp://example.com"),
            Err(TransportError::InvalidUrl(_))
        ));
        assert!(socket_url("not a url").is_err());
    }
}
