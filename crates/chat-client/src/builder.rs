//! Builder pattern for constructing a [`ChatClient`].

use std::sync::Arc;
use std::time::Duration;

use pl_auth::{AuthService, PresenceDirectory, RestAuthClient};
use pl_domain::config::Config;
use pl_domain::error::{Error, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::channel::ChannelManager;
use crate::client::ChatClient;
use crate::events::EventReceiver;
use crate::presence::PresenceFeed;
use crate::session::SessionManager;
use crate::transport::{Transport, WsTransport};
use crate::types::{NotificationReceiver, Notifier};

/// Fluent builder for [`ChatClient`].
///
/// # Example
///
/// ```rust,no_run
/// # use pl_client::ChatClientBuilder;
/// # use pl_domain::config::Config;
/// # async fn example() -> pl_domain::error::Result<()> {
/// let (mut client, mut events, mut notes) = ChatClientBuilder::from_config(&Config::default())?
///     .session_ttl(std::time::Duration::from_secs(300))
///     .build()?;
/// client.login("alice").await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatClientBuilder {
    pub(crate) auth: Option<Arc<dyn AuthService>>,
    pub(crate) presence: Option<Arc<dyn PresenceDirectory>>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) presence_feed: Option<PresenceFeed>,
    pub(crate) session_ttl: Duration,
    pub(crate) max_inbound_bytes: usize,
}

impl ChatClientBuilder {
    pub fn new() -> Self {
        Self {
            auth: None,
            presence: None,
            transport: None,
            presence_feed: None,
            session_ttl: Duration::from_secs(600),
            max_inbound_bytes: 64 * 1024,
        }
    }

    /// Wire the production REST service, WebSocket transport and (when
    /// `presence.watch` is set) the presence feed from `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let rest = Arc::new(RestAuthClient::new(&cfg.service)?);
        let transport = WsTransport::new(&cfg.service.ws_url, &cfg.channel);

        let mut builder = Self::new()
            .auth(rest.clone())
            .presence(rest)
            .transport(Arc::new(transport))
            .session_ttl(cfg.session.idle_timeout())
            .max_inbound_bytes(cfg.channel.max_inbound_bytes);
        if cfg.presence.watch {
            builder = builder.presence_feed(PresenceFeed::new(&cfg.service.ws_url, &cfg.presence));
        }
        Ok(builder)
    }

    // ── Collaborators ────────────────────────────────────────────────

    pub fn auth(mut self, auth: Arc<dyn AuthService>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn presence(mut self, presence: Arc<dyn PresenceDirectory>) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Subscribe to pushed presence updates once built.
    pub fn presence_feed(mut self, feed: PresenceFeed) -> Self {
        self.presence_feed = Some(feed);
        self
    }

    // ── Behavior ─────────────────────────────────────────────────────

    /// Fixed session lifetime from login (default 10 minutes).
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Largest inbound frame accepted (default 64 KB).
    pub fn max_inbound_bytes(mut self, n: usize) -> Self {
        self.max_inbound_bytes = n;
        self
    }

    /// Build the client together with its event queue and the display's
    /// notification stream.
    ///
    /// Spawns the presence feed if one was configured, so this must run
    /// inside a tokio runtime in that case.
    pub fn build(self) -> Result<(ChatClient, EventReceiver, NotificationReceiver)> {
        let auth = self
            .auth
            .ok_or_else(|| Error::Config("an auth service is required".into()))?;
        let presence = self
            .presence
            .ok_or_else(|| Error::Config("a presence directory is required".into()))?;
        let transport = self
            .transport
            .ok_or_else(|| Error::Config("a transport is required".into()))?;
        if self.session_ttl.is_zero() {
            return Err(Error::Config("session_ttl must be > 0".into()));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (notifier, notes_rx) = Notifier::channel();
        let cancel = CancellationToken::new();

        let presence_task = self
            .presence_feed
            .map(|feed| feed.spawn(events_tx.clone(), cancel.child_token()));

        let client = ChatClient {
            sessions: SessionManager::new(auth, events_tx.clone(), notifier.clone(), self.session_ttl),
            channels: ChannelManager::new(
                transport,
                presence,
                events_tx,
                notifier.clone(),
                self.max_inbound_bytes,
            ),
            notifier,
            online: Vec::new(),
            presence_task,
            cancel,
        };
        Ok((client, events_rx, notes_rx))
    }
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_collaborators() {
        match ChatClientBuilder::new().build() {
            Err(Error::Config(msg)) => assert!(msg.contains("auth service")),
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn from_config_wires_production_collaborators() {
        let cfg = Config::default();
        let builder = ChatClientBuilder::from_config(&cfg).unwrap();
        assert!(builder.presence_feed.is_none());
        assert_eq!(builder.session_ttl, Duration::from_secs(600));

        let (client, _events, _notes) = builder.build().unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(client.channel_state(), crate::ChannelState::Idle);
    }
}
