//! Presence feed: a background subscription to the service's pushed
//! online list.
//!
//! The service pushes the full list of logged-in identities on a fixed
//! cadence.  The feed forwards a [`ClientEvent::Presence`] only when the
//! list actually changes, and re-subscribes with [`ReconnectBackoff`] after
//! every drop until it is shut down.

use futures_util::StreamExt;
use pl_domain::config::PresenceConfig;
use pl_protocol::decode_presence;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::events::{ClientEvent, EventSender};
use crate::reconnect::ReconnectBackoff;

/// Where and how to subscribe.
#[derive(Debug, Clone)]
pub struct PresenceFeed {
    url: String,
    backoff: ReconnectBackoff,
}

impl PresenceFeed {
    pub fn new(ws_url: &str, cfg: &PresenceConfig) -> Self {
        Self {
            url: format!("{}{}", ws_url.trim_end_matches('/'), cfg.path),
            backoff: ReconnectBackoff::from_config(cfg),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the feed until `shutdown` is cancelled or the client is dropped.
    pub fn spawn(self, events: EventSender, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(events, shutdown))
    }

    async fn run(self, events: EventSender, shutdown: CancellationToken) {
        let mut last: Option<Vec<String>> = None;
        let mut attempt: u32 = 0;

        loop {
            let end = tokio::select! {
                _ = shutdown.cancelled() => break,
                end = watch_once(&self.url, &events, &mut last) => end,
            };

            match &end {
                WatchEnd::ClientGone => break,
                WatchEnd::Closed { .. } => {
                    tracing::info!(url = %self.url, "presence feed closed");
                }
                WatchEnd::Lost { error, .. } => {
                    tracing::warn!(url = %self.url, attempt, error = %error, "presence feed lost");
                }
            }
            if end.received() {
                attempt = 0;
            }

            let delay = self.backoff.delay_for_attempt(attempt);
            tracing::debug!(delay_ms = delay.as_millis() as u64, "re-subscribing to presence");
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            attempt = attempt.saturating_add(1);
        }

        tracing::debug!("presence feed stopped");
    }
}

#[derive(Debug)]
enum WatchEnd {
    /// The service ended the stream with a close frame.
    Closed { received: bool },
    /// The subscription failed or the connection dropped.
    Lost { received: bool, error: String },
    ClientGone,
}

impl WatchEnd {
    /// Whether at least one list arrived before the subscription ended.
    fn received(&self) -> bool {
        match self {
            Self::Closed { received } | Self::Lost { received, .. } => *received,
            Self::ClientGone => false,
        }
    }
}

async fn watch_once(url: &str, events: &EventSender, last: &mut Option<Vec<String>>) -> WatchEnd {
    let mut ws = match tokio_tungstenite::connect_async(url).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            return WatchEnd::Lost {
                received: false,
                error: e.to_string(),
            }
        }
    };
    tracing::debug!(url, "presence feed subscribed");

    let mut received = false;
    while let Some(frame) = ws.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                return WatchEnd::Lost {
                    received,
                    error: e.to_string(),
                }
            }
        };

        let mut online = match decode_presence(&text) {
            Ok(online) => online,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed presence frame");
                continue;
            }
        };
        received = true;
        online.sort();
        online.dedup();

        if last.as_ref() == Some(&online) {
            continue;
        }
        *last = Some(online.clone());
        if events.send(ClientEvent::Presence(online)).is_err() {
            return WatchEnd::ClientGone;
        }
    }

    WatchEnd::Closed { received }
}
