/// Shared error type used across all Parley crates.
///
/// The first group of variants is the chat client's user-facing taxonomy;
/// each renders as a message that can be shown to the user verbatim.  A
/// closed channel is not an error and travels as a notification instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("registration rejected: {reason}")]
    Registration { reason: String },

    #[error("login rejected: {0}")]
    Authentication(String),

    #[error("chat partner {partner} is not online")]
    PartnerUnreachable { partner: String },

    #[error("chat is not connected, please reconnect")]
    NotConnected,

    #[error("not logged in")]
    NotAuthenticated,

    #[error("malformed payload: {0}")]
    Protocol(String),

    #[error("transport: {0}")]
    Transport(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("service returned {status}: {detail}")]
    Service { status: u16, detail: String },

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("config: {0}")]
    Config(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) => true,
            Self::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_messages_are_readable() {
        let e = Error::PartnerUnreachable {
            partner: "dave".into(),
        };
        assert_eq!(e.to_string(), "chat partner dave is not online");

        let e = Error::Registration {
            reason: "Username already exists".into(),
        };
        assert_eq!(e.to_string(), "registration rejected: Username already exists");
    }

    #[test]
    fn only_server_side_and_network_failures_are_transient() {
        assert!(Error::Timeout("t".into()).is_transient());
        assert!(Error::Service {
            status: 503,
            detail: String::new()
        }
        .is_transient());
        assert!(!Error::Service {
            status: 400,
            detail: String::new()
        }
        .is_transient());
        assert!(!Error::NotConnected.is_transient());
    }
}
