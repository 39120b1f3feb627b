//! Scriptable signing client for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{broadcast, Semaphore};
use wcbridge_common::protocol::TxData;

use crate::client::{ClientError, SessionEvent, SigningClient};

pub struct MockClient {
    connected: AtomicBool,
    accounts: Mutex<Vec<String>>,
    chain_id: u64,
    events: broadcast::Sender<SessionEvent>,
    outcome: Mutex<Result<String, ClientError>>,
    connect_error: Mutex<Option<ClientError>>,
    /// When set, each signature waits for a permit.
    gate: Option<Semaphore>,
    pub sessions_created: AtomicUsize,
    pub killed: AtomicBool,
    pub signed: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            accounts: Mutex::new(Vec::new()),
            chain_id: 1,
            events: broadcast::channel(16).0,
            outcome: Mutex::new(Ok("0xsig".into())),
            connect_error: Mutex::new(None),
            gate: None,
            sessions_created: AtomicUsize::new(0),
            killed: AtomicBool::new(false),
            signed: Mutex::new(Vec::new()),
        }
    }

    /// A client with a stored session for `accounts`.
    pub fn connected(accounts: &[&str]) -> Self {
        let client = Self::new();
        client.connected.store(true, Ordering::SeqCst);
        *client.accounts.lock().unwrap() = accounts.iter().map(|a| a.to_string()).collect();
        client
    }

    /// Signatures block until [`MockClient::release`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.outcome.lock().unwrap() = Err(ClientError::new(message));
    }

    pub fn fail_connect(&self, message: &str) {
        *self.connect_error.lock().unwrap() = Some(ClientError::new(message));
    }

    pub fn emit(&self, event: SessionEvent) {
        if let SessionEvent::Connect { accounts, .. } = &event {
            self.connected.store(true, Ordering::SeqCst);
            *self.accounts.lock().unwrap() = accounts.clone();
        }
        let _ = self.events.send(event);
    }

    async fn sign(&self, what: String) -> Result<String, ClientError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.signed.lock().unwrap().push(what);
        self.outcome.lock().unwrap().clone()
    }
}

#[async_trait]
impl SigningClient for MockClient {
    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn accounts(&self) -> Vec<String> {
        self.accounts.lock().unwrap().clone()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn connect(&self) -> Result<(), ClientError> {
        match self.connect_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn create_session(&self) -> Result<(), ClientError> {
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_transaction(&self, tx: &TxData) -> Result<String, ClientError> {
        self.sign(format!("tx:{}", tx.to.clone().unwrap_or_default())).await
    }

    async fn sign_personal_message(
        &self,
        message: &str,
        _address: &str,
    ) -> Result<String, ClientError> {
        self.sign(format!("personal:{message}")).await
    }

    async fn sign_typed_data(
        &self,
        _address: &str,
        typed_data: &str,
    ) -> Result<String, ClientError> {
        self.sign(format!("typed:{typed_data}")).await
    }

    async fn kill_session(&self) -> Result<(), ClientError> {
        self.killed.store(true, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
