//! Shared types for the wallet bridge: errors, ids and the message
//! contract spoken between the extension, the iframe relay and the tab.

pub mod errors;
pub mod id;
pub mod protocol;

pub use errors::{BridgeError, ConfigError, ProtocolError, RelayError};
pub use id::{new_correlation_id, new_id, RelayId, RequestId};
pub use protocol::{
    Action, BroadcastMessage, CommandEnvelope, ReplyEnvelope, ReplyPayload, TabStatus, Target,
};

pub type Result<T> = std::result::Result<T, BridgeError>;
