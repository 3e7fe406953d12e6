mod channel;
mod presence;
mod service;
mod session;

pub use channel::*;
pub use presence::*;
pub use service::*;
pub use session::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !self.service.base_url.starts_with("http://")
            && !self.service.base_url.starts_with("https://")
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "service.base_url".into(),
                message: "base_url must be an http:// or https:// URL".into(),
            });
        }

        if !self.service.ws_url.starts_with("ws://") && !self.service.ws_url.starts_with("wss://") {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "service.ws_url".into(),
                message: "ws_url must be a ws:// or wss:// URL".into(),
            });
        }

        if self.service.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "service.timeout_ms".into(),
                message: "timeout_ms must be greater than 0".into(),
            });
        }

        if self.session.idle_timeout_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "session.idle_timeout_secs".into(),
                message: "idle_timeout_secs must be greater than 0".into(),
            });
        } else if self.session.idle_timeout_secs < 60 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "session.idle_timeout_secs".into(),
                message: "sessions shorter than a minute will expire mid-conversation".into(),
            });
        }

        if self.channel.max_inbound_bytes == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "channel.max_inbound_bytes".into(),
                message: "max_inbound_bytes must be greater than 0".into(),
            });
        }

        if self.channel.connect_timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "channel.connect_timeout_ms".into(),
                message: "connect_timeout_ms must be greater than 0".into(),
            });
        }

        if self.presence.watch && !self.presence.path.starts_with('/') {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "presence.path".into(),
                message: "path must start with '/'".into(),
            });
        }

        if self.presence.reconnect_initial_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "presence.reconnect_initial_ms".into(),
                message: "reconnect_initial_ms must be greater than 0".into(),
            });
        } else if self.presence.reconnect_initial_ms > self.presence.reconnect_max_ms {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "presence.reconnect_initial_ms".into(),
                message: "initial delay exceeds reconnect_max_ms and will be capped".into(),
            });
        }

        errors
    }
}
