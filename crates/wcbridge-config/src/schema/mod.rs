//! Configuration schema types for the wallet bridge.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the bridge shipped with.

mod channel;
mod relay;
mod system;
mod tab;

pub use channel::*;
pub use relay::*;
pub use system::*;
pub use tab::*;

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct BridgeConfig {
    pub channel: ChannelConfig,
    pub relay: RelayConfig,
    pub tab: TabConfig,
    pub logging: LoggingConfig,
}
