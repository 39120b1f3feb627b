//! The signing-session client the tab controller drives.

use async_trait::async_trait;
use tokio::sync::broadcast;
use wcbridge_common::protocol::TxData;

/// A failed client call. The message is shown to the user and sent back to
/// the extension verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Session lifecycle notifications pushed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connect { accounts: Vec<String>, chain_id: u64 },
    SessionUpdate { accounts: Vec<String>, chain_id: u64 },
    Disconnect,
}

#[async_trait]
pub trait SigningClient: Send + Sync {
    fn connected(&self) -> bool;

    fn accounts(&self) -> Vec<String>;

    fn chain_id(&self) -> u64;

    /// Restore a stored session if there is one.
    async fn connect(&self) -> Result<(), ClientError>;

    /// Start a new pairing. Called when `connect` left no live session.
    async fn create_session(&self) -> Result<(), ClientError>;

    fn events(&self) -> broadcast::Receiver<SessionEvent>;

    async fn sign_transaction(&self, tx: &TxData) -> Result<String, ClientError>;

    async fn sign_personal_message(
        &self,
        message: &str,
        address: &str,
    ) -> Result<String, ClientError>;

    /// `typed_data` is the JSON document produced by
    /// [`SignTypedDataParams::signing_payload`](wcbridge_common::protocol::SignTypedDataParams::signing_payload).
    async fn sign_typed_data(&self, address: &str, typed_data: &str)
        -> Result<String, ClientError>;

    async fn kill_session(&self) -> Result<(), ClientError>;
}
