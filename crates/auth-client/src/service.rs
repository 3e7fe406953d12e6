//! The `AuthService` and `PresenceDirectory` traits define the interface to
//! the remote chat service (REST, mock/test).

use async_trait::async_trait;
use pl_domain::error::Result;

use crate::types::Credentials;

/// Abstraction over the account endpoints of the chat service.
///
/// Implementations may talk to the real REST API or be a test double.
/// All methods return `pl_domain::error::Result`.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account (POST /register/{identity}).
    ///
    /// A rejected identity (e.g. already taken) is
    /// [`Error::Registration`](pl_domain::error::Error::Registration).
    async fn register(&self, identity: &str) -> Result<()>;

    /// Exchange an identity for a credential (POST /login/{identity}).
    ///
    /// An unknown identity is
    /// [`Error::Authentication`](pl_domain::error::Error::Authentication).
    async fn login(&self, identity: &str) -> Result<Credentials>;

    /// Invalidate a credential (POST /logout/{identity}).  Callers treat
    /// failures as best-effort.
    async fn logout(&self, credentials: &Credentials) -> Result<()>;
}

/// Who is currently reachable for a chat.
#[async_trait]
pub trait PresenceDirectory: Send + Sync {
    /// List logged-in identities (GET /logged-in-users).
    async fn list_online(&self) -> Result<Vec<String>>;
}
