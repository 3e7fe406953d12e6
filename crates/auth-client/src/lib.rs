//! `pl-auth`: client for the chat service's account and presence API.
//!
//! Provides the [`AuthService`] and [`PresenceDirectory`] traits that
//! abstract over the service, a production REST implementation
//! ([`RestAuthClient`]), and typed DTOs matching the service's responses.
//!
//! | Endpoint                   | Trait method                        |
//! |----------------------------|-------------------------------------|
//! | `POST /register/{user}`    | [`AuthService::register`]           |
//! | `POST /login/{user}`       | [`AuthService::login`]              |
//! | `POST /logout/{user}`      | [`AuthService::logout`]             |
//! | `GET /logged-in-users`     | [`PresenceDirectory::list_online`]  |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use pl_domain::config::ServiceConfig;
//! use pl_auth::{AuthService, PresenceDirectory, RestAuthClient};
//!
//! # async fn example() -> pl_domain::error::Result<()> {
//! let client = RestAuthClient::new(&ServiceConfig::default())?;
//! let creds = client.login("alice").await?;
//! let online = client.list_online().await?;
//! println!("{} sees {} users online", creds.identity(), online.len());
//! client.logout(&creds).await?;
//! # Ok(())
//! # }
//! ```

pub mod rest;
pub mod service;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use rest::{from_reqwest, RestAuthClient};
pub use service::{AuthService, PresenceDirectory};
pub use types::{Credentials, ErrorBody, LoginResponse, LogoutResponse, RegisterResponse};
