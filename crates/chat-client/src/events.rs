//! The single event queue that feeds the client.
//!
//! Every asynchronous source (a channel's transport, the session expiry
//! timer, the presence feed) runs in its own task and only ever talks to the
//! client by pushing a tagged [`ClientEvent`] into one unbounded queue.  The
//! host hands each event back to
//! [`ChatClient::handle_event`](crate::ChatClient::handle_event), so state
//! transitions happen one at a time on the host's task.

use std::fmt;

use tokio::sync::mpsc;

/// Generation number of a [`Channel`](crate::channel::Channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

/// Generation number of a [`Session`](crate::session::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s-{}", self.0)
    }
}

/// Lifecycle events a transport reports for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established and can carry messages.
    Ready,
    /// One inbound text frame, not yet decoded.
    Message(String),
    /// The remote side closed the connection cleanly.
    Closed { code: Option<u16>, reason: String },
    /// The connection failed or broke.
    Error(String),
}

/// Everything the host must feed back into the client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Transport {
        channel: ChannelId,
        event: TransportEvent,
    },
    SessionExpired {
        session: SessionId,
    },
    Presence(Vec<String>),
}

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

/// Handed to a [`Transport`](crate::transport::Transport) when a connection
/// is opened; tags every event with the channel it belongs to.
#[derive(Debug, Clone)]
pub struct TransportSink {
    channel: ChannelId,
    tx: EventSender,
}

impl TransportSink {
    pub(crate) fn new(channel: ChannelId, tx: EventSender) -> Self {
        Self { channel, tx }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Queue an event for the client.  Returns `false` once the client has
    /// been dropped, at which point the connection task should stop.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx
            .send(ClientEvent::Transport {
                channel: self.channel,
                event,
            })
            .is_ok()
    }
}
