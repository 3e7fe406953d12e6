//! Integration test: boots an in-process WebSocket server that plays the
//! chat service's `/chat/{user}/{partner}` relay, and drives a real
//! [`WsTransport`] through [`ChatClient`].
//!
//! Covers the parts the in-memory doubles cannot:
//! - the connection is addressed by `(local, partner)`
//! - the handshake completing is what opens the channel
//! - outbound payloads are single JSON text frames
//! - a clean server close and a failed connect are reported differently
//! - a local disconnect sends a close frame

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use pl_client::{
    AuthService, ChannelState, ChatClient, ChatClientBuilder, CloseCause, Credentials,
    EventReceiver, MessageOrigin, PresenceDirectory, WsTransport,
};
use pl_domain::config::ChannelConfig;
use pl_domain::error::Result;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

// ── Service stub: everyone is online, every login succeeds ─────────────

struct OpenService;

#[async_trait]
impl AuthService for OpenService {
    async fn register(&self, _identity: &str) -> Result<()> {
        Ok(())
    }

    async fn login(&self, identity: &str) -> Result<Credentials> {
        Ok(Credentials::new(identity, "tok"))
    }

    async fn logout(&self, _credentials: &Credentials) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PresenceDirectory for OpenService {
    async fn list_online(&self) -> Result<Vec<String>> {
        Ok(vec!["bob".into()])
    }
}

// ── Mini relay: in-process WS server ────────────────────────────────────

/// What the relay observed on one connection.
#[derive(Debug)]
enum Seen {
    Path(String),
    Text(String),
    Close(Option<u16>),
}

/// Accepts connections; replies to each text frame as "bob", and closes
/// cleanly when it receives a message whose body is `bye`.
async fn start_mini_relay() -> (SocketAddr, mpsc::UnboundedReceiver<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            let seen = seen_tx.clone();
            tokio::spawn(async move {
                let path_tx = seen.clone();
                let callback = move |req: &Request,
                                     resp: Response|
                      -> std::result::Result<Response, ErrorResponse> {
                    let _ = path_tx.send(Seen::Path(req.uri().path().to_owned()));
                    Ok(resp)
                };
                let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
                    .await
                    .unwrap();

                while let Some(Ok(frame)) = ws.next().await {
                    match frame {
                        Message::Text(text) => {
                            let _ = seen.send(Seen::Text(text.clone()));
                            let v: serde_json::Value = serde_json::from_str(&text).unwrap();
                            if v["message"] == "bye" {
                                ws.send(Message::Close(Some(CloseFrame {
                                    code: CloseCode::Normal,
                                    reason: "see you".into(),
                                })))
                                .await
                                .unwrap();
                                break;
                            }
                            let reply = serde_json::json!({
                                "sender": "bob",
                                "message": format!("got {}", v["message"].as_str().unwrap()),
                            });
                            ws.send(Message::Text(reply.to_string())).await.unwrap();
                        }
                        Message::Close(frame) => {
                            let _ = seen.send(Seen::Close(frame.map(|f| u16::from(f.code))));
                            break;
                        }
                        _ => {}
                    }
                }
            });
        }
    });

    (addr, seen_rx)
}

fn client_for(addr: SocketAddr) -> (ChatClient, EventReceiver) {
    let service = Arc::new(OpenService);
    let transport = WsTransport::new(
        &format!("ws://{addr}"),
        &ChannelConfig {
            connect_timeout_ms: 2_000,
            ..Default::default()
        },
    );
    let (client, events, _notes) = ChatClientBuilder::new()
        .auth(service.clone())
        .presence(service)
        .transport(Arc::new(transport))
        .build()
        .unwrap();
    (client, events)
}

/// Feed events into the client until `done` holds.
async fn drive_until(
    client: &mut ChatClient,
    events: &mut EventReceiver,
    done: impl Fn(&ChatClient) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(client) {
            let ev = events.recv().await.expect("event queue closed");
            client.handle_event(ev).await;
        }
    })
    .await
    .expect("timed out waiting for the client");
}

async fn next_seen(seen: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    tokio::time::timeout(Duration::from_secs(5), seen.recv())
        .await
        .expect("timed out waiting for the relay")
        .expect("relay stopped")
}

// ── Tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_round_trip_then_clean_server_close() {
    let (addr, mut seen) = start_mini_relay().await;
    let (mut client, mut events) = client_for(addr);

    client.login("alice").await.unwrap();
    client.connect("bob").await.unwrap();
    drive_until(&mut client, &mut events, |c| {
        c.channel_state() == ChannelState::Open
    })
    .await;

    match next_seen(&mut seen).await {
        Seen::Path(path) => assert_eq!(path, "/chat/alice/bob"),
        other => panic!("expected handshake path, got {other:?}"),
    }

    client.send("hello").unwrap();
    match next_seen(&mut seen).await {
        Seen::Text(text) => {
            let v: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(v, serde_json::json!({ "sender": "alice", "message": "hello" }));
        }
        other => panic!("expected a text frame, got {other:?}"),
    }

    drive_until(&mut client, &mut events, |c| {
        c.channel().map_or(0, |ch| ch.inbox().len()) == 2
    })
    .await;
    let inbox = client.channel().unwrap().inbox();
    assert_eq!(inbox[0].origin, MessageOrigin::Local);
    assert_eq!(inbox[1].origin, MessageOrigin::Remote);
    assert_eq!(inbox[1].to_string(), "bob: got hello");

    client.send("bye").unwrap();
    drive_until(&mut client, &mut events, |c| {
        c.channel_state() == ChannelState::Closed
    })
    .await;
    assert_eq!(
        client.channel().unwrap().close_cause(),
        Some(&CloseCause::Remote {
            code: Some(1000),
            reason: "see you".into()
        })
    );
}

#[tokio::test]
async fn local_disconnect_sends_a_close_frame() {
    let (addr, mut seen) = start_mini_relay().await;
    let (mut client, mut events) = client_for(addr);

    client.login("alice").await.unwrap();
    client.connect("bob").await.unwrap();
    drive_until(&mut client, &mut events, |c| {
        c.channel_state() == ChannelState::Open
    })
    .await;
    assert!(matches!(next_seen(&mut seen).await, Seen::Path(_)));

    assert!(client.disconnect());
    assert!(matches!(next_seen(&mut seen).await, Seen::Close(_)));
    assert_eq!(
        client.channel().unwrap().close_cause(),
        Some(&CloseCause::Local)
    );
}

#[tokio::test]
async fn unreachable_relay_closes_with_an_error() {
    // Bind and drop to obtain a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut client, mut events) = client_for(addr);
    client.login("alice").await.unwrap();
    client.connect("bob").await.unwrap();
    drive_until(&mut client, &mut events, |c| {
        c.channel_state() == ChannelState::Closed
    })
    .await;

    let cause = client.channel().unwrap().close_cause().unwrap();
    assert!(cause.is_error(), "expected an error close, got {cause:?}");
}
