//! Records and notifications shared between the client and its display.

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inbox
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where an inbox record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Echo of a message this client sent; never round-trips the transport.
    Local,
    /// Received from the transport.
    Remote,
}

/// One displayed chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxRecord {
    pub sender: String,
    pub body: String,
    pub origin: MessageOrigin,
    pub at: DateTime<Utc>,
}

impl InboxRecord {
    pub(crate) fn local(sender: &str, body: &str) -> Self {
        Self {
            sender: sender.to_owned(),
            body: body.to_owned(),
            origin: MessageOrigin::Local,
            at: Utc::now(),
        }
    }

    pub(crate) fn remote(sender: String, body: String) -> Self {
        Self {
            sender,
            body,
            origin: MessageOrigin::Remote,
            at: Utc::now(),
        }
    }
}

impl fmt::Display for InboxRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            MessageOrigin::Local => write!(f, "You: {}", self.body),
            MessageOrigin::Remote => write!(f, "{}: {}", self.sender, self.body),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcomes and causes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of a send that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Empty or whitespace-only body; nothing was transmitted.
    RejectedEmpty,
}

/// Why a channel ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    /// The user disconnected.
    Local,
    /// A new connect replaced this channel.
    Superseded,
    /// The session ended (logout, expiry, or re-login).
    SessionEnded,
    /// The remote side closed cleanly.
    Remote { code: Option<u16>, reason: String },
    /// The transport failed.
    Error(String),
}

impl CloseCause {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for CloseCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "disconnected"),
            Self::Superseded => write!(f, "replaced by a new chat"),
            Self::SessionEnded => write!(f, "session ended"),
            Self::Remote { code, reason } => {
                write!(f, "closed by server")?;
                if let Some(code) = code {
                    write!(f, " ({code})")?;
                }
                if !reason.is_empty() {
                    write!(f, ": {reason}")?;
                }
                Ok(())
            }
            Self::Error(detail) => write!(f, "connection error: {detail}"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Explicit,
    Expired,
    /// A new login replaced the session.
    Replaced,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "logged out"),
            Self::Expired => write!(f, "session expired"),
            Self::Replaced => write!(f, "replaced by a new login"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Notifications
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the display needs to be told about, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    LoggedIn {
        identity: String,
        expires_at: DateTime<Utc>,
    },
    LoggedOut {
        identity: String,
        reason: LogoutReason,
    },
    /// The service could not be told about a logout; local state was
    /// cleared anyway.
    LogoutNotifyFailed {
        identity: String,
        error: String,
    },
    ChannelConnecting {
        partner: String,
    },
    ChannelOpen {
        partner: String,
    },
    ChannelClosed {
        partner: String,
        cause: CloseCause,
    },
    Message(InboxRecord),
    ProtocolError {
        partner: String,
        detail: String,
    },
    PresenceChanged {
        online: Vec<String>,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedIn {
                identity,
                expires_at,
            } => write!(
                f,
                "Logged in as {identity} (session ends {})",
                expires_at.format("%H:%M:%S UTC")
            ),
            Self::LoggedOut { identity, reason } => write!(f, "{identity}: {reason}"),
            Self::LogoutNotifyFailed { identity, error } => {
                write!(f, "Could not notify the server that {identity} logged out: {error}")
            }
            Self::ChannelConnecting { partner } => write!(f, "Connecting to {partner}..."),
            Self::ChannelOpen { partner } => write!(f, "Chat with {partner} is open"),
            Self::ChannelClosed { partner, cause } => {
                write!(f, "Chat with {partner} disconnected: {cause}")
            }
            Self::Message(record) => write!(f, "{record}"),
            Self::ProtocolError { partner, detail } => {
                write!(f, "Ignored a malformed message from the chat with {partner}: {detail}")
            }
            Self::PresenceChanged { online } if online.is_empty() => write!(f, "Nobody is online"),
            Self::PresenceChanged { online } => write!(f, "Online: {}", online.join(", ")),
        }
    }
}

pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Sending half of the notification queue, shared by both managers.
#[derive(Debug, Clone)]
pub(crate) struct Notifier(mpsc::UnboundedSender<Notification>);

impl Notifier {
    pub(crate) fn channel() -> (Self, NotificationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    pub(crate) fn emit(&self, notification: Notification) {
        if self.0.send(notification).is_err() {
            tracing::trace!("notification dropped, display detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_echo_renders_as_you() {
        let r = InboxRecord::local("alice", "hello");
        assert_eq!(r.to_string(), "You: hello");
        let r = InboxRecord::remote("bob".into(), "hi".into());
        assert_eq!(r.to_string(), "bob: hi");
    }

    #[test]
    fn close_causes_distinguish_clean_close_from_error() {
        let clean = CloseCause::Remote {
            code: Some(1000),
            reason: "bye".into(),
        };
        assert!(!clean.is_error());
        assert_eq!(clean.to_string(), "closed by server (1000): bye");

        let err = CloseCause::Error("reset by peer".into());
        assert!(err.is_error());
        assert_eq!(err.to_string(), "connection error: reset by peer");
    }

    #[test]
    fn presence_notification_lists_names() {
        let n = Notification::PresenceChanged {
            online: vec!["bob".into(), "carol".into()],
        };
        assert_eq!(n.to_string(), "Online: bob, carol");
        let n = Notification::PresenceChanged { online: vec![] };
        assert_eq!(n.to_string(), "Nobody is online");
    }
}
