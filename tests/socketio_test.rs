//! Socket.IO Transport Integration Tests
//! Run with: cargo test --test socketio_test
//!
//! A scripted websocket server on localhost plays the Socket.IO side.

use std::sync::Once;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use linechat::domain::entities::{ClientEvent, ServerEvent};
use linechat::domain::traits::Transport;
use linechat::infrastructure::adapters::SocketIoTransport;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

const OPEN: &str =
    r#"0{"sid":"abc123","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

async fn next_event(events: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream ended")
}

#[tokio::test]
async fn test_handshake_events_ping_and_close() {
    ensure_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (frames_tx, mut frames_rx) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        ws.send(Message::Text(OPEN.to_string())).await.unwrap();
        let connect = ws.next().await.unwrap().unwrap();
        assert_eq!(connect, Message::Text("40".to_string()));

        ws.send(Message::Text(r#"40{"sid":"xyz"}"#.to_string())).await.unwrap();
        ws.send(Message::Text(r#"42["user_count",{"count":3}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::Text(
            r#"42["chat_message",{"username":"bob","content":"hi **all**","timestamp":"2024-05-01T10:00:00.000Z"}]"#
                .to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text("2".to_string())).await.unwrap();

        // Pong, then the join the test emits
        for _ in 0..2 {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => frames_tx.send(text).unwrap(),
                other => panic!("unexpected frame {:?}", other),
            }
        }

        ws.close(None).await.unwrap();
    });

    let (transport, mut events) = SocketIoTransport::connect(&format!("http://{}", addr))
        .await
        .unwrap();
    assert!(transport.is_connected());

    assert_eq!(next_event(&mut events).await, ServerEvent::Connected);
    assert_eq!(next_event(&mut events).await, ServerEvent::UserCount { count: 3 });
    match next_event(&mut events).await {
        ServerEvent::ChatMessage(msg) => {
            assert_eq!(msg.username, "bob");
            assert_eq!(msg.content, "hi **all**");
            assert!(msg.sent_at().is_some());
        }
        other => panic!("unexpected event {:?}", other),
    }

    let pong = tokio::time::timeout(Duration::from_secs(5), frames_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pong, "3");

    transport
        .emit(ClientEvent::Join {
            username: "amy".to_string(),
        })
        .await
        .unwrap();
    let join = tokio::time::timeout(Duration::from_secs(5), frames_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(join, r#"42["join",{"username":"amy"}]"#);

    assert!(matches!(
        next_event(&mut events).await,
        ServerEvent::Disconnected(_)
    ));
    assert!(!transport.is_connected());
    assert!(transport
        .emit(ClientEvent::Typing {
            username: "amy".to_string()
        })
        .await
        .is_err());

    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_error_is_reported() {
    ensure_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(OPEN.to_string())).await.unwrap();
        let _ = ws.next().await;
        ws.send(Message::Text(r#"44{"message":"Not authorized"}"#.to_string()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
    });

    let (_transport, mut events) = SocketIoTransport::connect(&format!("http://{}", addr))
        .await
        .unwrap();

    assert_eq!(
        next_event(&mut events).await,
        ServerEvent::ConnectError("Not authorized".to_string())
    );
    assert!(matches!(
        next_event(&mut events).await,
        ServerEvent::Disconnected(_)
    ));

    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_refused() {
    ensure_init();

    // Bind and drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    assert!(SocketIoTransport::connect(&format!("http://{}", addr))
        .await
        .is_err());
}

#[tokio::test]
async fn test_offline_transport() {
    ensure_init();

    let (transport, mut events) = SocketIoTransport::offline();
    assert!(!transport.is_connected());
    assert!(events.recv().await.is_none());
    assert!(transport
        .emit(ClientEvent::Join {
            username: "amy".to_string()
        })
        .await
        .is_err());
}

#[tokio::test]
async fn test_disconnect_flushes_before_returning() {
    ensure_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(OPEN.to_string())).await.unwrap();
        let _ = ws.next().await;
        ws.send(Message::Text(r#"40{"sid":"xyz"}"#.to_string())).await.unwrap();

        let mut frames = Vec::new();
        while let Some(Ok(message)) = ws.next().await {
            let closing = message.is_close();
            frames.push(message);
            if closing {
                break;
            }
        }
        frames
    });

    let (transport, mut events) = SocketIoTransport::connect(&format!("http://{}", addr))
        .await
        .unwrap();
    assert_eq!(next_event(&mut events).await, ServerEvent::Connected);

    transport.disconnect().await;
    assert!(!transport.is_connected());

    let frames = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(frames.first(), Some(&Message::Text("41".to_string())));
    assert!(frames.last().unwrap().is_close());
}
