//! Iframe relay: accepts commands from the extension window, holds them
//! until the bridge tab is ready, forwards them over the broadcast channel
//! and routes correlated replies back up.

mod context;
mod pending;
mod readiness;
mod relay;
mod tab;

pub use context::{RelayContext, RelaySettings};
pub use relay::IframeRelay;
