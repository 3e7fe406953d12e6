use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat channel transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// How long the WebSocket handshake may take before the attempt is
    /// reported as a transport error.
    #[serde(default = "d_10000")]
    pub connect_timeout_ms: u64,
    /// Inbound frames larger than this are dropped as protocol errors.
    #[serde(default = "d_64k")]
    pub max_inbound_bytes: usize,
}

impl ChannelConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: d_10000(),
            max_inbound_bytes: d_64k(),
        }
    }
}

fn d_10000() -> u64 {
    10_000
}
fn d_64k() -> usize {
    64 * 1024
}
