//! Session Manager: the authenticated-identity lifecycle.
//!
//! A [`Session`] exists exactly while the client is Authenticated.  Its
//! expiry timer is armed once, at login, for a fixed duration and is never
//! renewed by activity.  Every way a session can end (explicit logout,
//! expiry, replacement by a new login) runs the same teardown in
//! [`SessionManager::logout`], so the channel never outlives the session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pl_auth::{AuthService, Credentials};
use pl_domain::error::Result;
use pl_domain::identity::validate_identity;
use pl_domain::trace::TraceEvent;
use tokio::task::JoinHandle;

use crate::channel::ChannelManager;
use crate::events::{ClientEvent, EventSender, SessionId};
use crate::types::{CloseCause, LogoutReason, Notification, Notifier};

/// The current authenticated session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    credentials: Credentials,
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    expiry: JoinHandle<()>,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn identity(&self) -> &str {
        self.credentials.identity()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.expiry.abort();
    }
}

/// Owns the optional [`Session`] and its expiry timer.
pub struct SessionManager {
    auth: Arc<dyn AuthService>,
    events: EventSender,
    notifier: Notifier,
    ttl: Duration,
    next_id: u64,
    current: Option<Session>,
}

impl SessionManager {
    pub(crate) fn new(
        auth: Arc<dyn AuthService>,
        events: EventSender,
        notifier: Notifier,
        ttl: Duration,
    ) -> Self {
        Self {
            auth,
            events,
            notifier,
            ttl,
            next_id: 0,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.current.as_ref().map(Session::identity)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Create an account.  Never logs in.
    pub async fn register(&self, identity: &str) -> Result<()> {
        let identity = validate_identity(identity)?;
        self.auth.register(identity).await?;
        tracing::info!(identity, "registered");
        Ok(())
    }

    /// Exchange `identity` for a credential and arm the expiry timer.
    ///
    /// An existing session is torn down first (reason `Replaced`), taking
    /// its channel with it.  A rejected login leaves the client Anonymous.
    pub async fn login(&mut self, identity: &str, channels: &mut ChannelManager) -> Result<()> {
        let identity = validate_identity(identity)?;

        if self.current.is_some() {
            self.logout(channels, LogoutReason::Replaced).await;
        }

        let credentials = self.auth.login(identity).await?;
        self.start(credentials);
        Ok(())
    }

    fn start(&mut self, credentials: Credentials) {
        self.next_id += 1;
        let id = SessionId(self.next_id);

        let events = self.events.clone();
        let ttl = self.ttl;
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // The client may already be gone; nothing to expire then.
            let _ = events.send(ClientEvent::SessionExpired { session: id });
        });

        let started_at = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| started_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        TraceEvent::SessionStarted {
            session_id: id.0,
            identity: credentials.identity().to_owned(),
            expires_in_secs: ttl.as_secs(),
        }
        .emit();
        tracing::info!(session = %id, identity = credentials.identity(), "logged in");
        self.notifier.emit(Notification::LoggedIn {
            identity: credentials.identity().to_owned(),
            expires_at,
        });

        self.current = Some(Session {
            id,
            credentials,
            started_at,
            expires_at,
            expiry,
        });
    }

    /// End the current session.  Returns `false` (and does nothing) when
    /// already Anonymous.
    ///
    /// Order: close the channel, tell the service, cancel the timer, drop
    /// the credential, report.  A failed service notification is reported
    /// but never stops the local teardown.
    pub async fn logout(&mut self, channels: &mut ChannelManager, reason: LogoutReason) -> bool {
        let Some(session) = self.current.as_ref() else {
            return false;
        };
        let identity = session.identity().to_owned();

        channels.force_close(CloseCause::SessionEnded);

        if let Err(e) = self.auth.logout(&session.credentials).await {
            tracing::warn!(identity = %identity, error = %e, "service logout failed, clearing local session anyway");
            self.notifier.emit(Notification::LogoutNotifyFailed {
                identity: identity.clone(),
                error: e.to_string(),
            });
        }

        session.expiry.abort();
        let Some(session) = self.current.take() else {
            return false;
        };

        TraceEvent::SessionEnded {
            session_id: session.id.0,
            identity: identity.clone(),
            reason: reason.to_string(),
        }
        .emit();
        tracing::info!(session = %session.id, identity = %identity, %reason, "session ended");
        self.notifier.emit(Notification::LoggedOut { identity, reason });
        true
    }

    /// Handle a fired expiry timer.  Timers of sessions that already ended
    /// are ignored.
    pub async fn handle_expiry(&mut self, id: SessionId, channels: &mut ChannelManager) -> bool {
        if self.current.as_ref().map(Session::id) != Some(id) {
            tracing::debug!(session = %id, "ignoring expiry of a finished session");
            return false;
        }
        self.logout(channels, LogoutReason::Expired).await
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("current", &self.current)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
