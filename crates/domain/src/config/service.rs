use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat service endpoints
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the authentication / presence REST API.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Base URL for WebSocket endpoints (`/chat/...`, `/notifications`).
    #[serde(default = "d_ws_url")]
    pub ws_url: String,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    /// Extra attempts for idempotent requests on transient failures.
    #[serde(default = "d_2")]
    pub max_retries: u32,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            ws_url: d_ws_url(),
            timeout_ms: 8000,
            max_retries: 2,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://localhost:8000".into()
}
fn d_ws_url() -> String {
    "ws://localhost:8000".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_2() -> u32 {
    2
}
