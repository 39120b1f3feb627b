//! Loopback signing client for running the bridge locally.
//!
//! Pairs instantly and "signs" with HMAC-SHA256 under a per-process random
//! key. Signatures are deterministic for the life of the process but carry
//! no on-chain meaning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tokio::sync::broadcast;
use wcbridge_common::protocol::TxData;
use wcbridge_tab::{ClientError, SessionEvent, SigningClient};

type HmacSha256 = Hmac<Sha256>;

/// Error returned for every signature in reject mode.
pub const REJECTED: &str = "User rejected the request.";

pub struct LoopbackSigner {
    bridge_url: String,
    key: [u8; 32],
    accounts: Mutex<Vec<String>>,
    chain_id: u64,
    connected: AtomicBool,
    reject: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl LoopbackSigner {
    /// `bridge_url` is the relay a remote client would pair through. The
    /// loopback signer only reports it.
    pub fn new(bridge_url: String, accounts: Vec<String>, chain_id: u64, reject: bool) -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self {
            bridge_url,
            key,
            accounts: Mutex::new(accounts),
            chain_id,
            connected: AtomicBool::new(false),
            reject,
            events: broadcast::channel(16).0,
        }
    }

    fn sign(&self, kind: &str, payload: &[u8]) -> Result<String, ClientError> {
        if !self.connected() {
            return Err(ClientError::new("Session currently disconnected"));
        }
        if self.reject {
            return Err(ClientError::new(REJECTED));
        }
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| ClientError::new(format!("signer key error: {e}")))?;
        mac.update(kind.as_bytes());
        mac.update(&[0]);
        mac.update(payload);
        let sig = mac.finalize().into_bytes();
        tracing::debug!(kind, "Loopback signature produced");
        Ok(format!("0x{}", hex::encode(sig)))
    }
}

#[async_trait]
impl SigningClient for LoopbackSigner {
    fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn accounts(&self) -> Vec<String> {
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn connect(&self) -> Result<(), ClientError> {
        if self.bridge_url.is_empty() {
            return Err(ClientError::new("no bridge url configured"));
        }
        tracing::debug!(bridge = %self.bridge_url, "Loopback client connected");
        Ok(())
    }

    async fn create_session(&self) -> Result<(), ClientError> {
        self.connected.store(true, Ordering::Release);
        let accounts = self.accounts();
        tracing::info!(
            bridge = %self.bridge_url,
            accounts = accounts.len(),
            "Loopback session paired"
        );
        let _ = self.events.send(SessionEvent::Connect {
            accounts,
            chain_id: self.chain_id,
        });
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_transaction(&self, tx: &TxData) -> Result<String, ClientError> {
        let payload = serde_json::to_vec(tx)
            .map_err(|e| ClientError::new(format!("unserializable transaction: {e}")))?;
        self.sign("eth_signTransaction", &payload)
    }

    async fn sign_personal_message(
        &self,
        message: &str,
        address: &str,
    ) -> Result<String, ClientError> {
        let payload = format!("{address}:{message}");
        self.sign("personal_sign", payload.as_bytes())
    }

    async fn sign_typed_data(
        &self,
        address: &str,
        typed_data: &str,
    ) -> Result<String, ClientError> {
        let payload = format!("{address}:{typed_data}");
        self.sign("eth_signTypedData", payload.as_bytes())
    }

    async fn kill_session(&self) -> Result<(), ClientError> {
        if self.connected.swap(false, Ordering::AcqRel) {
            let _ = self.events.send(SessionEvent::Disconnect);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIDGE: &str = "https://bridge.walletconnect.org";

    fn signer(reject: bool) -> LoopbackSigner {
        LoopbackSigner::new(BRIDGE.into(), vec!["0xAA".into()], 1, reject)
    }

    #[tokio::test]
    async fn connect_requires_bridge_url() {
        assert!(signer(false).connect().await.is_ok());
        let unconfigured = LoopbackSigner::new(String::new(), vec!["0xAA".into()], 1, false);
        let err = unconfigured.connect().await.unwrap_err();
        assert_eq!(err.message, "no bridge url configured");
    }

    #[tokio::test]
    async fn create_session_connects_and_notifies() {
        let signer = signer(false);
        let mut events = signer.events();
        assert!(!signer.connected());

        signer.create_session().await.unwrap();
        assert!(signer.connected());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Connect {
                accounts: vec!["0xAA".into()],
                chain_id: 1
            }
        );
    }

    #[tokio::test]
    async fn signatures_are_deterministic_per_key() {
        let signer = signer(false);
        signer.create_session().await.unwrap();

        let a = signer.sign_personal_message("hello", "0xAA").await.unwrap();
        let b = signer.sign_personal_message("hello", "0xAA").await.unwrap();
        let c = signer.sign_personal_message("hullo", "0xAA").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), 2 + 64);
    }

    #[tokio::test]
    async fn reject_mode_refuses() {
        let signer = signer(true);
        signer.create_session().await.unwrap();
        let err = signer.sign_transaction(&TxData::default()).await.unwrap_err();
        assert_eq!(err.message, REJECTED);
    }

    #[tokio::test]
    async fn disconnected_signer_refuses() {
        let signer = signer(false);
        assert!(signer.sign_typed_data("0xAA", "{}").await.is_err());
    }

    #[tokio::test]
    async fn kill_session_disconnects_once() {
        let signer = signer(false);
        signer.create_session().await.unwrap();
        let mut events = signer.events();

        signer.kill_session().await.unwrap();
        signer.kill_session().await.unwrap();
        assert!(!signer.connected());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Disconnect);
        assert!(events.try_recv().is_err());
    }
}
