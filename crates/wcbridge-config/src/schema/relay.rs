use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the iframe relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Logical window name of the signing tab. Reused across commands.
    pub tab_name: String,
    /// URL a freshly opened tab is navigated to.
    pub tab_url: String,
    /// Interval between readiness pings while waiting for the tab
    /// (valid range: 10-60000).
    pub ping_interval_ms: u32,
    /// How long a command waits for the tab to report ready
    /// (valid range: 1-3600).
    pub ready_timeout_secs: u32,
    /// How long a forwarded command waits for its reply
    /// (valid range: 1-86400).
    pub reply_timeout_secs: u32,
}

impl RelayConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.ping_interval_ms))
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.ready_timeout_secs))
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.reply_timeout_secs))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tab_name: "walletconnect-tab".into(),
            tab_url: "http://localhost:3000".into(),
            ping_interval_ms: 1000,
            ready_timeout_secs: 120,
            reply_timeout_secs: 600,
        }
    }
}
