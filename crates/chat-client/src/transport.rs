//! Chat transport: the seam between the channel state machine and the
//! network.
//!
//! A [`Transport`] opens one connection per channel and reports its
//! lifecycle through the [`TransportSink`] it was given.  The returned
//! [`TransportLink`] is the only handle to that connection; the channel
//! manager owns it exclusively and dropping it tears the connection down.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pl_domain::config::ChannelConfig;
use pl_domain::error::{Error, Result};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::events::{TransportEvent, TransportSink};

/// Opens chat connections addressed by `(local, partner)`.
pub trait Transport: Send + Sync {
    /// Start connecting and return immediately.  `Ready` (or `Error`) is
    /// reported later through `sink`.
    fn open(&self, local: &str, partner: &str, sink: TransportSink) -> Box<dyn TransportLink>;
}

/// Exclusive handle to one open (or opening) connection.
pub trait TransportLink: Send {
    /// Queue one text frame.
    fn send(&mut self, payload: String) -> Result<()>;

    /// Close the connection.  Idempotent; no further events are reported.
    fn close(&mut self);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WebSocket transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Transport`] over the chat service's `/chat/{local}/{partner}`
/// WebSocket endpoint, one JSON text frame per message.
#[derive(Debug, Clone)]
pub struct WsTransport {
    ws_url: String,
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(ws_url: &str, cfg: &ChannelConfig) -> Self {
        Self {
            ws_url: ws_url.trim_end_matches('/').to_owned(),
            connect_timeout: cfg.connect_timeout(),
        }
    }

    fn chat_url(&self, local: &str, partner: &str) -> String {
        format!("{}/chat/{local}/{partner}", self.ws_url)
    }
}

impl Transport for WsTransport {
    fn open(&self, local: &str, partner: &str, sink: TransportSink) -> Box<dyn TransportLink> {
        let url = self.chat_url(local, partner);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(run_connection(
            url,
            self.connect_timeout,
            outbound_rx,
            cancel.clone(),
            sink,
        ));

        Box::new(WsLink {
            outbound: outbound_tx,
            cancel,
        })
    }
}

struct WsLink {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl TransportLink for WsLink {
    fn send(&mut self, payload: String) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Transport("connection is closed".into()));
        }
        self.outbound
            .send(payload)
            .map_err(|_| Error::Transport("connection task has exited".into()))
    }

    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WsLink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Single connection lifecycle: connect -> ready -> frame loop.
///
/// Reports exactly one terminal event (`Closed` or `Error`) unless the
/// link cancels it first, in which case it sends a close frame and exits
/// silently.
async fn run_connection(
    url: String,
    connect_timeout: Duration,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    sink: TransportSink,
) {
    let channel = sink.channel();
    tracing::debug!(%channel, url = %url, "opening chat connection");

    let connect = tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(url.as_str()));
    let ws = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(%channel, "connect cancelled");
            return;
        }
        result = connect => match result {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                sink.emit(TransportEvent::Error(e.to_string()));
                return;
            }
            Err(_) => {
                sink.emit(TransportEvent::Error(format!(
                    "handshake timed out after {}ms",
                    connect_timeout.as_millis()
                )));
                return;
            }
        },
    };

    if !sink.emit(TransportEvent::Ready) {
        return;
    }

    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!(%channel, error = %e, "close frame not delivered");
                }
                break;
            }
            Some(payload) = outbound.recv() => {
                if let Err(e) = write.send(Message::Text(payload)).await {
                    sink.emit(TransportEvent::Error(format!("send failed: {e}")));
                    break;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if !sink.emit(TransportEvent::Message(text)) {
                        break;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => {
                    // The protocol is text-only; let the decoder report it.
                    sink.emit(TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(f) => (Some(u16::from(f.code)), f.reason.into_owned()),
                        None => (None, String::new()),
                    };
                    sink.emit(TransportEvent::Closed { code, reason });
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    sink.emit(TransportEvent::Error(e.to_string()));
                    break;
                }
                None => {
                    sink.emit(TransportEvent::Closed {
                        code: None,
                        reason: "connection closed".into(),
                    });
                    break;
                }
            },
        }
    }

    tracing::debug!(%channel, "chat connection task finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_addresses_local_and_partner() {
        let t = WsTransport::new("ws://localhost:8000/", &ChannelConfig::default());
        assert_eq!(t.chat_url("alice", "bob"), "ws://localhost:8000/chat/alice/bob");
    }

    #[test]
    fn connect_timeout_comes_from_config() {
        let cfg = ChannelConfig {
            connect_timeout_ms: 2500,
            ..Default::default()
        };
        let t = WsTransport::new("wss://chat.example.com", &cfg);
        assert_eq!(t.connect_timeout, Duration::from_millis(2500));
    }
}
