use serde::{Deserialize, Serialize};

/// The same-origin broadcast channel shared by relay and tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel name; every participant must agree on it.
    pub name: String,
    /// Messages buffered per subscriber before the slowest one lags
    /// (valid range: 1-4096).
    pub capacity: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: "walletconnect".into(),
            capacity: 64,
        }
    }
}
