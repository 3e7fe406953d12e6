//! `pl-client`: the Parley chat client state machine.
//!
//! Composes two state machines and keeps them consistent:
//!
//! - the **session** (Anonymous / Authenticated) with a fixed expiry timer
//!   armed at login, and
//! - the **channel** (Idle / Connecting / Open / Closed) to one chat
//!   partner over a pluggable [`Transport`].
//!
//! A channel never outlives its session: every way a session ends closes
//! the channel first.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ commands  ┌────────────────────────────────────────┐
//! │   display    │──────────▶│ ChatClient                             │
//! │ (CLI / test) │           │   SessionManager ── AuthService        │
//! │              │◀──────────│   ChannelManager ── PresenceDirectory  │
//! └──────────────┘ Notifi-   │                  └─ Transport          │
//!        │         cations   └────────────────────────────────────────┘
//!        │                                    ▲
//!        │  handle_event(ev)                  │ ClientEvent
//!        └────────────────────────────────────┘ (transport, expiry
//!                                                timer, presence feed)
//! ```
//!
//! Background tasks never touch client state.  They push tagged
//! [`ClientEvent`]s into one queue; the host feeds each one back through
//! [`ChatClient::handle_event`], so transitions are applied one at a time
//! and events for a channel or session that has already ended are
//! ignored.
//!
//! # Host loop
//!
//! ```rust,no_run
//! # use pl_client::ChatClientBuilder;
//! # use pl_domain::config::Config;
//! # async fn example() -> pl_domain::error::Result<()> {
//! let (mut client, mut events, mut notes) =
//!     ChatClientBuilder::from_config(&Config::default())?.build()?;
//! client.login("alice").await?;
//! client.connect("bob").await?;
//! loop {
//!     tokio::select! {
//!         Some(ev) = events.recv() => client.handle_event(ev).await,
//!         Some(note) = notes.recv() => println!("{note}"),
//!         else => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod channel;
pub mod client;
pub mod events;
pub mod presence;
pub mod reconnect;
pub mod session;
pub mod transport;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::ChatClientBuilder;
pub use channel::{Channel, ChannelManager, ChannelState};
pub use client::ChatClient;
pub use events::{ChannelId, ClientEvent, EventReceiver, SessionId, TransportEvent, TransportSink};
pub use presence::PresenceFeed;
pub use reconnect::ReconnectBackoff;
pub use session::{Session, SessionManager};
pub use transport::{Transport, TransportLink, WsTransport};
pub use types::{
    CloseCause, InboxRecord, LogoutReason, MessageOrigin, Notification, NotificationReceiver,
    SendOutcome,
};

// Re-exported so hosts and transports need not depend on pl-auth directly.
pub use pl_auth::{AuthService, Credentials, PresenceDirectory};
