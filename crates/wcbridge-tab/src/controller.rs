//! Tab controller: owns the signing session and answers relay commands.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use wcbridge_channel::{BroadcastHub, BroadcastPort};
use wcbridge_common::{Action, BroadcastMessage, Target};

use crate::client::{ClientError, SessionEvent, SigningClient};
use crate::context::{Placement, TabContext, TabSettings};
use crate::dispatch::handle_command;
use crate::session::{Lifecycle, TabSnapshot};

pub struct TabController {
    ctx: Arc<TabContext>,
}

impl TabController {
    pub fn new(
        settings: TabSettings,
        placement: Placement,
        hub: BroadcastHub,
        client: Arc<dyn SigningClient>,
    ) -> Self {
        Self {
            ctx: Arc::new(TabContext::new(settings, placement, hub, client)),
        }
    }

    pub fn context(&self) -> Arc<TabContext> {
        self.ctx.clone()
    }

    pub fn snapshot(&self) -> TabSnapshot {
        self.ctx.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<TabSnapshot> {
        self.ctx.subscribe()
    }

    /// Register a callback run after every dispatched command.
    pub fn on_cleanup(&self, hook: impl Fn(&Action) + Send + Sync + 'static) {
        self.ctx.set_cleanup_hook(Arc::new(hook));
    }

    /// Start (or restore) the signing session and begin serving the relay.
    ///
    /// On failure the controller is back in `Disconnected` and the client's
    /// error is returned.
    pub async fn connect(&self) -> Result<(), ClientError> {
        if self.ctx.snapshot().lifecycle != Lifecycle::Disconnected {
            tracing::debug!("Connect ignored, session already started");
            return Ok(());
        }
        self.ctx.open_session();
        let client = self.ctx.client.clone();

        // 1. Subscribe before connecting so no event is missed.
        let events = client.events();

        // 2. Restore or create the session.
        let started = async {
            client.connect().await?;
            if !client.connected() {
                tracing::info!("No stored session, creating one");
                client.create_session().await?;
            }
            Ok::<(), ClientError>(())
        }
        .await;
        if let Err(e) = started {
            tracing::warn!(error = %e, "Failed to start signing session");
            self.ctx.reset();
            return Err(e);
        }

        // 3. Join the relay channel and start the session loop.
        let port = match self.ctx.placement {
            Placement::TopLevel => Some(self.ctx.attach_peer()),
            Placement::Embedded => None,
        };
        let stop = CancellationToken::new();
        self.ctx.set_session_stop(stop.clone());
        tokio::spawn(session_loop(self.ctx.clone(), events, port, stop));

        // 4. A restored session is usable right away.
        if client.connected() {
            self.ctx.on_connected(client.accounts(), client.chain_id());
        }
        Ok(())
    }

    /// End the session at the user's request.
    pub async fn kill(&self) {
        if let Some(client) = self.ctx.signing_client() {
            if let Err(e) = client.kill_session().await {
                tracing::warn!(error = %e, "Failed to kill session");
            }
        }
        self.ctx.reset();
    }

    pub fn reset(&self) {
        self.ctx.reset();
    }

    /// The tab is going away.
    pub fn unload(&self) {
        self.ctx.unload();
    }
}

/// Serve client events and relay traffic until stopped.
async fn session_loop(
    ctx: Arc<TabContext>,
    events: broadcast::Receiver<SessionEvent>,
    port: Option<BroadcastPort>,
    stop: CancellationToken,
) {
    let mut events = Some(events);
    let mut port = port;

    loop {
        tokio::select! {
            biased;

            _ = stop.cancelled() => break,

            event = next_event(&mut events) => match event {
                Ok(event) => ctx.on_session_event(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Session events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Session event stream closed");
                    events = None;
                }
            },

            value = next_broadcast(&mut port) => match value {
                Some(value) => on_broadcast(&ctx, value),
                None => port = None,
            },
        }
    }

    if let Some(port) = port {
        port.close();
    }
    tracing::debug!("Session loop stopped");
}

fn on_broadcast(ctx: &Arc<TabContext>, value: serde_json::Value) {
    match BroadcastMessage::classify(&value) {
        BroadcastMessage::Command(command) if command.target == Target::Tab => {
            tokio::spawn(handle_command(ctx.clone(), command));
        }
        BroadcastMessage::Status(status) => {
            if let Some(relay) = &status.relay {
                ctx.release_relay(relay);
            }
        }
        _ => {}
    }
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<SessionEvent>>,
) -> Result<SessionEvent, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_broadcast(port: &mut Option<BroadcastPort>) -> Option<serde_json::Value> {
    match port {
        Some(port) => port.recv().await,
        None => std::future::pending().await,
    }
}
