use serde::Serialize;

/// Structured trace events emitted across all Parley crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ServiceCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    SessionStarted {
        session_id: u64,
        identity: String,
        expires_in_secs: u64,
    },
    SessionEnded {
        session_id: u64,
        identity: String,
        reason: String,
    },
    ChannelTransition {
        channel_id: u64,
        partner: String,
        from: String,
        to: String,
    },
    ProtocolViolation {
        channel_id: u64,
        detail: String,
        bytes: usize,
    },
    PresenceUpdated {
        online: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "pl_event");
    }
}
