//! Shared building blocks for every Parley crate: configuration, the error
//! taxonomy, structured trace events, and identity validation.

pub mod config;
pub mod error;
pub mod identity;
pub mod trace;
