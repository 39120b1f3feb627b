//! State shared by the tab controller, its session loop and command tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use wcbridge_channel::{BroadcastHub, BroadcastPort, BroadcastSender};
use wcbridge_common::{Action, CommandEnvelope, RelayId, ReplyEnvelope, TabStatus};
use wcbridge_config::BridgeConfig;

use crate::client::{SessionEvent, SigningClient};
use crate::display::CallResult;
use crate::session::{Lifecycle, TabSnapshot};

/// Error text for a command from a relay other than the bound one.
pub const FENCED_MESSAGE: &str = "channel claimed by another relay";

#[derive(Debug, Clone)]
pub struct TabSettings {
    pub channel_name: String,
    pub chain_id: u64,
}

impl TabSettings {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            channel_name: config.channel.name.clone(),
            chain_id: config.tab.chain_id,
        }
    }
}

impl Default for TabSettings {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

/// Where the controller is running. Only a top-level tab joins the
/// broadcast channel; an embedded copy of the page stays off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    TopLevel,
    Embedded,
}

/// Called once after every dispatched command, whatever its outcome.
pub type CleanupHook = Arc<dyn Fn(&Action) + Send + Sync>;

pub struct TabContext {
    pub(crate) settings: TabSettings,
    pub(crate) placement: Placement,
    hub: BroadcastHub,
    pub(crate) client: Arc<dyn SigningClient>,
    session: Mutex<Option<Arc<dyn SigningClient>>>,
    state: watch::Sender<TabSnapshot>,
    peer: Mutex<Option<BroadcastSender>>,
    bound_relay: Mutex<Option<RelayId>>,
    session_stop: Mutex<Option<CancellationToken>>,
    in_flight: AtomicUsize,
    cleanup_hook: Mutex<Option<CleanupHook>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl TabContext {
    pub fn new(
        settings: TabSettings,
        placement: Placement,
        hub: BroadcastHub,
        client: Arc<dyn SigningClient>,
    ) -> Self {
        let state = watch::Sender::new(TabSnapshot::initial(settings.chain_id));
        Self {
            settings,
            placement,
            hub,
            client,
            session: Mutex::new(None),
            state,
            peer: Mutex::new(None),
            bound_relay: Mutex::new(None),
            session_stop: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            cleanup_hook: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> TabSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TabSnapshot> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected()
    }

    pub(crate) fn update(&self, modify: impl FnOnce(&mut TabSnapshot)) {
        self.state.send_modify(modify);
    }

    pub(crate) fn show_result(&self, result: CallResult) {
        self.update(|s| s.result = Some(result));
    }

    /// A signature request is waiting on the user.
    pub(crate) fn begin_request(&self, address: &str) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.update(|s| {
            s.pending_request = true;
            s.show_modal = true;
            if s.address.is_none() && !address.is_empty() {
                s.address = Some(address.to_string());
            }
        });
    }

    pub(crate) fn end_request(&self) {
        let left = self.in_flight.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
        self.update(|s| s.pending_request = left > 0);
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub(crate) fn open_session(&self) {
        *lock(&self.session) = Some(self.client.clone());
        self.update(|s| s.lifecycle = Lifecycle::Connecting);
    }

    /// The live signing client, if a session has been started.
    pub fn signing_client(&self) -> Option<Arc<dyn SigningClient>> {
        lock(&self.session).clone()
    }

    pub(crate) fn on_connected(&self, accounts: Vec<String>, chain_id: u64) {
        tracing::info!(accounts = accounts.len(), chain_id, "Signing session connected");
        self.update(|s| {
            s.lifecycle = Lifecycle::Connected;
            s.set_accounts(accounts, chain_id);
        });
        self.broadcast_status(true);
    }

    pub(crate) fn on_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Connect { accounts, chain_id } => self.on_connected(accounts, chain_id),
            SessionEvent::SessionUpdate { accounts, chain_id } => {
                tracing::info!(accounts = accounts.len(), chain_id, "Session updated");
                self.update(|s| s.set_accounts(accounts, chain_id));
            }
            SessionEvent::Disconnect => {
                tracing::info!("Signing session disconnected");
                self.reset();
            }
        }
    }

    pub(crate) fn set_session_stop(&self, stop: CancellationToken) {
        if let Some(previous) = lock(&self.session_stop).replace(stop) {
            previous.cancel();
        }
    }

    fn stop_session_loop(&self) {
        if let Some(stop) = lock(&self.session_stop).take() {
            stop.cancel();
        }
    }

    /// Announce not-ready, leave the channel and forget everything.
    pub fn reset(&self) {
        self.broadcast_status(false);
        lock(&self.peer).take();
        self.stop_session_loop();
        lock(&self.session).take();
        lock(&self.bound_relay).take();
        self.state
            .send_replace(TabSnapshot::initial(self.settings.chain_id));
        tracing::debug!("Tab state reset");
    }

    /// Announce not-ready and stop listening. State is left as is.
    pub fn unload(&self) {
        self.broadcast_status(false);
        lock(&self.peer).take();
        self.stop_session_loop();
        tracing::info!("Tab unloaded");
    }

    // -----------------------------------------------------------------------
    // Broadcast peer
    // -----------------------------------------------------------------------

    pub(crate) fn attach_peer(&self) -> BroadcastPort {
        let port = self.hub.join(&self.settings.channel_name);
        *lock(&self.peer) = Some(port.sender());
        tracing::debug!(channel = %self.settings.channel_name, "Joined relay channel");
        port
    }

    pub fn has_peer(&self) -> bool {
        lock(&self.peer).is_some()
    }

    pub(crate) fn broadcast_status(&self, ready: bool) {
        let status = if ready {
            TabStatus::ready()
        } else {
            TabStatus::unready()
        };
        let peer = lock(&self.peer).clone();
        match peer {
            Some(peer) => {
                if let Err(e) = peer.post_json(&status) {
                    tracing::debug!(ready, error = %e, "Status not sent");
                }
            }
            None => tracing::debug!(ready, "No relay channel, status not sent"),
        }
    }

    /// Post a reply to the relay. Dropped unless the session is connected at
    /// the moment of sending.
    pub(crate) fn send_reply(&self, reply: &ReplyEnvelope) {
        if !self.is_connected() {
            tracing::debug!(action = %reply.action, id = ?reply.id, "Not connected, reply dropped");
            return;
        }
        let peer = lock(&self.peer).clone();
        let Some(peer) = peer else {
            tracing::debug!(action = %reply.action, "No relay channel, reply dropped");
            return;
        };
        if let Err(e) = peer.post_json(reply) {
            tracing::warn!(action = %reply.action, error = %e, "Failed to send reply");
        }
    }

    // -----------------------------------------------------------------------
    // Relay fencing
    // -----------------------------------------------------------------------

    /// Bind to the first relay that sends a command; reject the others.
    ///
    /// Connection-checks and commands without a relay id pass untouched.
    pub(crate) fn check_fence(&self, command: &CommandEnvelope) -> Result<(), ReplyEnvelope> {
        let Some(relay) = &command.relay else {
            return Ok(());
        };
        if command.action == Action::ConnectionCheck {
            return Ok(());
        }
        let mut bound = lock(&self.bound_relay);
        match bound.as_ref() {
            None => {
                tracing::info!(relay = %relay, "Bound to relay");
                *bound = Some(relay.clone());
                Ok(())
            }
            Some(current) if current == relay => Ok(()),
            Some(current) => {
                tracing::warn!(relay = %relay, bound = %current, "Command from fenced relay");
                Err(ReplyEnvelope::error(command, FENCED_MESSAGE))
            }
        }
    }

    /// Drop the binding if `relay` is the bound one.
    pub(crate) fn release_relay(&self, relay: &RelayId) {
        let mut bound = lock(&self.bound_relay);
        if bound.as_ref() == Some(relay) {
            tracing::info!(relay = %relay, "Bound relay unloaded");
            *bound = None;
        }
    }

    pub fn bound_relay(&self) -> Option<RelayId> {
        lock(&self.bound_relay).clone()
    }

    // -----------------------------------------------------------------------
    // Cleanup hook
    // -----------------------------------------------------------------------

    pub fn set_cleanup_hook(&self, hook: CleanupHook) {
        *lock(&self.cleanup_hook) = Some(hook);
    }

    pub(crate) fn cleanup_hook(&self) -> Option<CleanupHook> {
        lock(&self.cleanup_hook).clone()
    }
}
