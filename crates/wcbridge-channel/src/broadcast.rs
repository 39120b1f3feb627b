//! Named same-origin broadcast channels.
//!
//! Every peer that joins a name receives every value posted by the *other*
//! peers on that name, in per-sender order. A peer never sees its own posts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::ChannelError;

#[derive(Debug, Clone)]
struct Frame {
    sender: u64,
    data: serde_json::Value,
}

/// Registry of named channels. Clones share the same channels.
#[derive(Clone)]
pub struct BroadcastHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Frame>>>>,
    next_peer: Arc<AtomicU64>,
    capacity: usize,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            next_peer: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe a new peer to the channel called `name`.
    pub fn join(&self, name: &str) -> BroadcastPort {
        let tx = {
            let mut map = self.channels.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(name.to_string())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .clone()
        };
        let rx = tx.subscribe();
        let peer = self.next_peer.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(channel = name, peer, "Joined broadcast channel");

        BroadcastPort {
            name: name.to_string(),
            rx,
            sender: BroadcastSender {
                peer,
                tx,
                closed: Arc::new(AtomicBool::new(false)),
            },
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Posting half of a port. Cheap to clone into spawned tasks; stops
/// delivering once the owning port is closed.
#[derive(Clone)]
pub struct BroadcastSender {
    peer: u64,
    tx: broadcast::Sender<Frame>,
    closed: Arc<AtomicBool>,
}

impl BroadcastSender {
    /// Post a raw value. Returns how many other peers were listening.
    pub fn post(&self, data: serde_json::Value) -> Result<usize, ChannelError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ChannelError::Closed);
        }
        let frame = Frame {
            sender: self.peer,
            data,
        };
        // Our own receiver is always subscribed, so a send never fails here
        // while the port is alive.
        let receivers = self.tx.send(frame).map_err(|_| ChannelError::Closed)?;
        Ok(receivers.saturating_sub(1))
    }

    /// Serialize `message` and post it.
    pub fn post_json<T: Serialize>(&self, message: &T) -> Result<usize, ChannelError> {
        self.post(serde_json::to_value(message)?)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// One peer's membership in a named channel.
pub struct BroadcastPort {
    name: String,
    rx: broadcast::Receiver<Frame>,
    sender: BroadcastSender,
}

impl BroadcastPort {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sender(&self) -> BroadcastSender {
        self.sender.clone()
    }

    pub fn post(&self, data: serde_json::Value) -> Result<usize, ChannelError> {
        self.sender.post(data)
    }

    pub fn post_json<T: Serialize>(&self, message: &T) -> Result<usize, ChannelError> {
        self.sender.post_json(message)
    }

    /// Next value posted by another peer. `None` once the port is closed.
    pub async fn recv(&mut self) -> Option<serde_json::Value> {
        loop {
            if self.sender.is_closed() {
                return None;
            }
            match self.rx.recv().await {
                Ok(frame) if frame.sender == self.sender.peer => continue,
                Ok(frame) => return Some(frame.data),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(channel = %self.name, skipped = n, "Broadcast channel lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Leave the channel. Senders cloned from this port stop delivering.
    pub fn close(&self) {
        if !self.sender.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(channel = %self.name, peer = self.sender.peer, "Left broadcast channel");
        }
    }
}

impl Drop for BroadcastPort {
    fn drop(&mut self) {
        self.sender.closed.store(true, Ordering::Release);
    }
}
