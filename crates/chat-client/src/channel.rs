//! Channel Manager: owns at most one chat channel and its transport.
//!
//! ```text
//! Idle ----(connect)----> Connecting
//! Connecting --(ready)--> Open
//! Connecting --(error / close)--> Closed
//! Open --(remote close | error | force_close)--> Closed
//! Closed --(connect)--> Connecting      (always a fresh Channel)
//! ```
//!
//! The transport handle is present exactly while a channel is Connecting
//! or Open.  Events are tagged with the channel's [`ChannelId`]; anything
//! addressed to a channel that is no longer the live one is dropped.

use std::fmt;
use std::sync::Arc;

use pl_auth::PresenceDirectory;
use pl_domain::error::{Error, Result};
use pl_domain::identity::validate_identity;
use pl_domain::trace::TraceEvent;
use pl_protocol::ChatPayload;

use crate::events::{ChannelId, EventSender, TransportEvent, TransportSink};
use crate::transport::{Transport, TransportLink};
use crate::types::{CloseCause, InboxRecord, Notification, Notifier, SendOutcome};

/// Observable state of the chat channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No channel has been attempted yet.
    Idle,
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One attempted or active connection to a partner.
pub struct Channel {
    id: ChannelId,
    partner: String,
    state: ChannelState,
    link: Option<Box<dyn TransportLink>>,
    inbox: Vec<InboxRecord>,
    close_cause: Option<CloseCause>,
}

impl Channel {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn partner(&self) -> &str {
        &self.partner
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Messages in arrival order, local echoes included.
    pub fn inbox(&self) -> &[InboxRecord] {
        &self.inbox
    }

    /// Set once the channel is Closed.
    pub fn close_cause(&self) -> Option<&CloseCause> {
        self.close_cause.as_ref()
    }

    /// Connecting or Open.
    pub fn is_live(&self) -> bool {
        matches!(self.state, ChannelState::Connecting | ChannelState::Open)
    }

    /// Whether this channel still owns a transport handle.
    pub fn holds_transport(&self) -> bool {
        self.link.is_some()
    }

    fn transition(&mut self, to: ChannelState) {
        TraceEvent::ChannelTransition {
            channel_id: self.id.0,
            partner: self.partner.clone(),
            from: self.state.to_string(),
            to: to.to_string(),
        }
        .emit();
        self.state = to;
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("partner", &self.partner)
            .field("state", &self.state)
            .field("holds_transport", &self.link.is_some())
            .field("inbox_len", &self.inbox.len())
            .field("close_cause", &self.close_cause)
            .finish()
    }
}

/// Owns the current [`Channel`] and every transition it goes through.
pub struct ChannelManager {
    transport: Arc<dyn Transport>,
    presence: Arc<dyn PresenceDirectory>,
    events: EventSender,
    notifier: Notifier,
    max_inbound_bytes: usize,
    next_id: u64,
    current: Option<Channel>,
}

impl ChannelManager {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        presence: Arc<dyn PresenceDirectory>,
        events: EventSender,
        notifier: Notifier,
        max_inbound_bytes: usize,
    ) -> Self {
        Self {
            transport,
            presence,
            events,
            notifier,
            max_inbound_bytes,
            next_id: 0,
            current: None,
        }
    }

    /// The most recent channel, live or Closed.
    pub fn current(&self) -> Option<&Channel> {
        self.current.as_ref()
    }

    pub fn state(&self) -> ChannelState {
        self.current
            .as_ref()
            .map_or(ChannelState::Idle, |c| c.state)
    }

    /// Query the presence directory.
    pub async fn list_online(&self) -> Result<Vec<String>> {
        self.presence.list_online().await
    }

    /// Check that `partner` is online, tear down any live channel, and
    /// start connecting a fresh one as `local`.
    ///
    /// A failed or negative presence check leaves the current channel
    /// untouched and opens nothing.
    pub async fn connect(&mut self, local: &str, partner: &str) -> Result<ChannelId> {
        let partner = validate_identity(partner)?;

        let online = self.presence.list_online().await?;
        if !online.iter().any(|name| name == partner) {
            tracing::info!(partner, online = online.len(), "partner not online");
            return Err(Error::PartnerUnreachable {
                partner: partner.to_owned(),
            });
        }

        self.force_close(CloseCause::Superseded);

        self.next_id += 1;
        let id = ChannelId(self.next_id);
        let sink = TransportSink::new(id, self.events.clone());
        let link = self.transport.open(local, partner, sink);

        TraceEvent::ChannelTransition {
            channel_id: id.0,
            partner: partner.to_owned(),
            from: self.state().to_string(),
            to: ChannelState::Connecting.to_string(),
        }
        .emit();

        self.current = Some(Channel {
            id,
            partner: partner.to_owned(),
            state: ChannelState::Connecting,
            link: Some(link),
            inbox: Vec::new(),
            close_cause: None,
        });
        tracing::info!(channel = %id, local, partner, "connecting");
        self.notifier.emit(Notification::ChannelConnecting {
            partner: partner.to_owned(),
        });
        Ok(id)
    }

    /// Transmit `body` as `sender` and append a local echo.
    ///
    /// Blank bodies are rejected before the channel state is even looked
    /// at; they never reach the transport or the inbox.
    pub fn send(&mut self, sender: &str, body: &str) -> Result<SendOutcome> {
        if body.trim().is_empty() {
            return Ok(SendOutcome::RejectedEmpty);
        }

        let channel = match self.current.as_mut() {
            Some(c) if c.state == ChannelState::Open => c,
            _ => return Err(Error::NotConnected),
        };
        let link = channel.link.as_mut().ok_or(Error::NotConnected)?;

        let payload = ChatPayload::new(sender, body).encode()?;
        link.send(payload)?;

        let record = InboxRecord::local(sender, body);
        channel.inbox.push(record.clone());
        self.notifier.emit(Notification::Message(record));
        Ok(SendOutcome::Sent)
    }

    /// Close the live channel, if any.  Returns whether anything was
    /// closed; calling it again is a no-op.
    pub fn force_close(&mut self, cause: CloseCause) -> bool {
        let Some(channel) = self.current.as_mut().filter(|c| c.is_live()) else {
            return false;
        };

        if let Some(mut link) = channel.link.take() {
            link.close();
        }
        channel.transition(ChannelState::Closed);
        channel.close_cause = Some(cause.clone());

        if cause.is_error() {
            tracing::warn!(channel = %channel.id, partner = %channel.partner, cause = %cause, "channel closed");
        } else {
            tracing::info!(channel = %channel.id, partner = %channel.partner, cause = %cause, "channel closed");
        }
        self.notifier.emit(Notification::ChannelClosed {
            partner: channel.partner.clone(),
            cause,
        });
        true
    }

    /// Apply one transport event to the channel it is addressed to.
    pub fn handle_transport(&mut self, id: ChannelId, event: TransportEvent) {
        let max_inbound = self.max_inbound_bytes;
        let Some(channel) = self.current.as_mut().filter(|c| c.id == id && c.is_live()) else {
            tracing::debug!(channel = %id, ?event, "dropping event for stale channel");
            return;
        };

        let close = match event {
            TransportEvent::Ready => {
                if channel.state == ChannelState::Connecting {
                    channel.inbox.clear();
                    channel.transition(ChannelState::Open);
                    tracing::info!(channel = %id, partner = %channel.partner, "channel open");
                    self.notifier.emit(Notification::ChannelOpen {
                        partner: channel.partner.clone(),
                    });
                }
                None
            }
            TransportEvent::Message(text) => {
                if channel.state != ChannelState::Open {
                    tracing::warn!(channel = %id, "message before ready, dropping");
                    return;
                }
                let decoded = if text.len() > max_inbound {
                    Err(Error::Protocol(format!(
                        "frame of {} bytes exceeds the {max_inbound} byte limit",
                        text.len()
                    )))
                } else {
                    ChatPayload::decode(&text)
                };
                match decoded {
                    Ok(payload) => {
                        let record = InboxRecord::remote(payload.sender, payload.message);
                        channel.inbox.push(record.clone());
                        self.notifier.emit(Notification::Message(record));
                    }
                    Err(e) => {
                        TraceEvent::ProtocolViolation {
                            channel_id: id.0,
                            detail: e.to_string(),
                            bytes: text.len(),
                        }
                        .emit();
                        tracing::warn!(channel = %id, error = %e, "dropping malformed message");
                        self.notifier.emit(Notification::ProtocolError {
                            partner: channel.partner.clone(),
                            detail: e.to_string(),
                        });
                    }
                }
                None
            }
            TransportEvent::Closed { code, reason } => Some(CloseCause::Remote { code, reason }),
            TransportEvent::Error(detail) => Some(CloseCause::Error(detail)),
        };

        if let Some(cause) = close {
            self.force_close(cause);
        }
    }
}

impl fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelManager")
            .field("current", &self.current)
            .field("max_inbound_bytes", &self.max_inbound_bytes)
            .finish_non_exhaustive()
    }
}
