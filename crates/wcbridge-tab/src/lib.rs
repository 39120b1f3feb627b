//! Tab controller for the wallet bridge.
//!
//! Owns the signing session, answers readiness pings, and turns commands
//! from the relay into signing-client calls:
//! - Unlock (account list)
//! - Transaction, personal-message and typed-data signatures
//! - Display records of each call for the approval modal

pub mod client;
pub mod context;
pub mod controller;
mod dispatch;
pub mod display;
pub mod session;
pub mod typed_data;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientError, SessionEvent, SigningClient};
pub use context::{CleanupHook, Placement, TabContext, TabSettings, FENCED_MESSAGE};
pub use controller::TabController;
pub use dispatch::{NOT_CONNECTED, NOT_SUPPORTED, NO_SESSION};
pub use display::CallResult;
pub use session::{Lifecycle, TabSnapshot};
