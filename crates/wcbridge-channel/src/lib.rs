//! Messaging substrates shared by the iframe relay and the tab controller.
//!
//! Provides in-process stand-ins for the two browser boundaries:
//! - Named broadcast channels (same-origin fan-out, sender excluded)
//! - Cross-window `postMessage` with source and origin
//! - Opening or reusing a top-level window by logical name

pub mod broadcast;
pub mod window;

pub use broadcast::{BroadcastHub, BroadcastPort, BroadcastSender};
pub use window::{
    MemoryTab, NamedWindows, TabWindow, Window, WindowHandle, WindowId, WindowMessage,
    WindowOpener, ANY_ORIGIN, BLANK_LOCATION,
};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,

    #[error("failed to open window: {0}")]
    Open(String),

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}
