use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Presence feed
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Subscribe to the service's pushed online list.
    #[serde(default)]
    pub watch: bool,
    #[serde(default = "d_path")]
    pub path: String,
    #[serde(default = "d_1000")]
    pub reconnect_initial_ms: u64,
    #[serde(default = "d_30000")]
    pub reconnect_max_ms: u64,
}

impl PresenceConfig {
    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            watch: false,
            path: d_path(),
            reconnect_initial_ms: d_1000(),
            reconnect_max_ms: d_30000(),
        }
    }
}

fn d_path() -> String {
    "/notifications".into()
}
fn d_1000() -> u64 {
    1000
}
fn d_30000() -> u64 {
    30_000
}
