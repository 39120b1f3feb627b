//! Per-relay context shared by the run loop and every command task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use wcbridge_channel::{BroadcastSender, TabWindow, WindowHandle, WindowOpener, ANY_ORIGIN};
use wcbridge_common::{RelayId, TabStatus};
use wcbridge_config::RelayConfig;

use crate::pending::PendingTable;

/// Relay tuning, derived from `[relay]` in the config file.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub tab_name: String,
    pub tab_url: String,
    pub ping_interval: Duration,
    pub ready_timeout: Duration,
    pub reply_timeout: Duration,
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            tab_name: config.tab_name.clone(),
            tab_url: config.tab_url.clone(),
            ping_interval: config.ping_interval(),
            ready_timeout: config.ready_timeout(),
            reply_timeout: config.reply_timeout(),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

/// Everything a relay knows. Built once per relay instance and handed to
/// every handler as an `Arc`.
pub struct RelayContext {
    pub(crate) id: RelayId,
    pub(crate) settings: RelaySettings,
    pub(crate) channel: BroadcastSender,
    /// The iframe's own window; used as `source` when posting upward.
    pub(crate) own: WindowHandle,
    pub(crate) parent: WindowHandle,
    pub(crate) opener: Arc<dyn WindowOpener>,
    pub(crate) tabs: Mutex<HashMap<String, Arc<dyn TabWindow>>>,
    pub(crate) ready: watch::Sender<bool>,
    pub(crate) pending: Mutex<PendingTable>,
    pub(crate) cancel: CancellationToken,
    unloaded: AtomicBool,
}

impl RelayContext {
    pub(crate) fn new(
        settings: RelaySettings,
        channel: BroadcastSender,
        own: WindowHandle,
        parent: WindowHandle,
        opener: Arc<dyn WindowOpener>,
    ) -> Self {
        Self {
            id: RelayId::new(),
            settings,
            channel,
            own,
            parent,
            opener,
            tabs: Mutex::new(HashMap::new()),
            ready: watch::Sender::new(false),
            pending: Mutex::new(PendingTable::new()),
            cancel: CancellationToken::new(),
            unloaded: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &RelayId {
        &self.id
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Number of forwarded commands still awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    pub(crate) fn pending(&self) -> MutexGuard<'_, PendingTable> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Post a value to the extension. The destination origin is a wildcard.
    pub(crate) fn post_to_parent<T: Serialize>(&self, message: &T) {
        let value = match serde_json::to_value(message) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize message for extension");
                return;
            }
        };
        if !self.parent.post_message(value, &self.own, ANY_ORIGIN) {
            tracing::warn!(relay = %self.id, "Extension window is gone, message dropped");
        }
    }

    /// Broadcast that this relay is going away. Only the first call sends.
    pub fn unload(&self) {
        if self.unloaded.swap(true, Ordering::AcqRel) {
            return;
        }
        self.cancel.cancel();
        match self.channel.post_json(&TabStatus::relay_gone(self.id.clone())) {
            Ok(_) => tracing::info!(relay = %self.id, "Relay unloaded"),
            Err(e) => tracing::debug!(relay = %self.id, error = %e, "Unload signal not sent"),
        }
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded.load(Ordering::Acquire)
    }
}
