//! The client facade the display talks to.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use pl_domain::error::{Error, Result};
use pl_domain::trace::TraceEvent;

use crate::channel::{Channel, ChannelManager, ChannelState};
use crate::events::{ChannelId, ClientEvent};
use crate::session::{Session, SessionManager};
use crate::types::{CloseCause, LogoutReason, Notification, Notifier, SendOutcome};

/// A session manager and a channel manager composed so that a channel
/// never outlives its session.
///
/// Create via [`ChatClientBuilder`](crate::builder::ChatClientBuilder).
/// Commands are `&mut self` methods; asynchronous happenings arrive on the
/// [`EventReceiver`](crate::events::EventReceiver) returned by the builder
/// and must be passed back through [`handle_event`](Self::handle_event).
pub struct ChatClient {
    pub(crate) sessions: SessionManager,
    pub(crate) channels: ChannelManager,
    pub(crate) notifier: Notifier,
    pub(crate) online: Vec<String>,
    pub(crate) presence_task: Option<JoinHandle<()>>,
    pub(crate) cancel: CancellationToken,
}

impl ChatClient {
    /// Start a new builder.
    pub fn builder() -> crate::builder::ChatClientBuilder {
        crate::builder::ChatClientBuilder::new()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn register(&self, identity: &str) -> Result<()> {
        self.sessions.register(identity).await
    }

    /// Log in, replacing any current session.
    pub async fn login(&mut self, identity: &str) -> Result<()> {
        self.sessions.login(identity, &mut self.channels).await
    }

    /// Log out.  Returns `false` when there was no session.
    pub async fn logout(&mut self) -> bool {
        self.sessions
            .logout(&mut self.channels, LogoutReason::Explicit)
            .await
    }

    /// Open a chat with `partner` as the logged-in identity.
    pub async fn connect(&mut self, partner: &str) -> Result<ChannelId> {
        let local = self
            .sessions
            .identity()
            .ok_or(Error::NotAuthenticated)?
            .to_owned();
        self.channels.connect(&local, partner).await
    }

    /// Send `body` on the open channel.
    pub fn send(&mut self, body: &str) -> Result<SendOutcome> {
        // Without a session there is never an Open channel, so an empty
        // sender only ever reaches the blank-body and NotConnected paths.
        let sender = self.sessions.identity().unwrap_or_default().to_owned();
        self.channels.send(&sender, body)
    }

    /// Close the chat.  Returns `false` when nothing was live.
    pub fn disconnect(&mut self) -> bool {
        self.channels.force_close(CloseCause::Local)
    }

    /// Ask the service who is online and refresh the cached list.
    pub async fn list_online(&mut self) -> Result<Vec<String>> {
        let online = self.channels.list_online().await?;
        self.update_presence(online.clone());
        Ok(online)
    }

    /// Apply one event from the queue.
    pub async fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Transport { channel, event } => {
                self.channels.handle_transport(channel, event);
            }
            ClientEvent::SessionExpired { session } => {
                self.sessions
                    .handle_expiry(session, &mut self.channels)
                    .await;
            }
            ClientEvent::Presence(online) => self.update_presence(online),
        }
    }

    /// Stop background tasks and end the session.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.presence_task.take() {
            task.abort();
        }
        self.sessions
            .logout(&mut self.channels, LogoutReason::Explicit)
            .await;
    }

    fn update_presence(&mut self, mut online: Vec<String>) {
        online.sort();
        online.dedup();
        if online == self.online {
            return;
        }
        TraceEvent::PresenceUpdated {
            online: online.len(),
        }
        .emit();
        self.online = online.clone();
        self.notifier.emit(Notification::PresenceChanged { online });
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn identity(&self) -> Option<&str> {
        self.sessions.identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// The most recent channel, live or Closed.
    pub fn channel(&self) -> Option<&Channel> {
        self.channels.current()
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channels.state()
    }

    /// Last known online identities, sorted.
    pub fn online(&self) -> &[String] {
        &self.online
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("sessions", &self.sessions)
            .field("channels", &self.channels)
            .field("online", &self.online)
            .finish_non_exhaustive()
    }
}
