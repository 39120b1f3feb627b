use serde::{Deserialize, Serialize};

/// Configuration for the tab controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabConfig {
    /// Remote signing relay the session client connects through.
    pub bridge_url: String,
    /// Chain id assumed until the session reports one.
    pub chain_id: u64,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            bridge_url: "https://bridge.walletconnect.org".into(),
            chain_id: 1,
        }
    }
}
