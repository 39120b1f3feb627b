//! In-process wiring of extension window, iframe relay and tab controller.

use std::sync::Arc;

use serde::Serialize;
use wcbridge_channel::{BroadcastHub, NamedWindows, Window, WindowHandle, ANY_ORIGIN};
use wcbridge_config::BridgeConfig;
use wcbridge_relay::{IframeRelay, RelayContext, RelaySettings};
use wcbridge_tab::{ClientError, Placement, SigningClient, TabController, TabSettings};

/// Origin the stand-in extension window reports.
pub const EXTENSION_ORIGIN: &str = "chrome-extension://wcbridge";

pub struct Bridge {
    extension: Window,
    relay: WindowHandle,
    relay_ctx: Arc<RelayContext>,
    tab: TabController,
    windows: Arc<NamedWindows>,
}

impl Bridge {
    /// Start the relay and connect the tab's signing session.
    pub async fn start(
        config: &BridgeConfig,
        client: Arc<dyn SigningClient>,
    ) -> Result<Self, ClientError> {
        let hub = BroadcastHub::new(config.channel.capacity as usize);
        let windows = Arc::new(NamedWindows::new());
        let extension = Window::new(EXTENSION_ORIGIN);

        let relay = IframeRelay::new(
            RelaySettings::from(&config.relay),
            Window::new(config.relay.tab_url.clone()),
            extension.handle(),
            hub.join(&config.channel.name),
            windows.clone(),
        );
        let relay_ctx = relay.context();
        let relay_handle = relay.handle();
        tokio::spawn(relay.run());

        let tab = TabController::new(
            TabSettings::from_config(config),
            Placement::TopLevel,
            hub,
            client,
        );
        if let Err(e) = tab.connect().await {
            relay_ctx.unload();
            return Err(e);
        }

        tracing::info!(relay = %relay_ctx.id(), "Bridge started");
        Ok(Self {
            extension,
            relay: relay_handle,
            relay_ctx,
            tab,
            windows,
        })
    }

    /// Post a command to the relay as the extension would.
    pub fn send<T: Serialize>(&self, command: &T) -> bool {
        match serde_json::to_value(command) {
            Ok(value) => self
                .relay
                .post_message(value, &self.extension.handle(), ANY_ORIGIN),
            Err(e) => {
                tracing::warn!(error = %e, "Unserializable command");
                false
            }
        }
    }

    /// Next message the relay posted to the extension.
    pub async fn recv(&mut self) -> Option<serde_json::Value> {
        self.extension.recv().await.map(|msg| msg.data)
    }

    #[cfg(test)]
    pub fn tab(&self) -> &TabController {
        &self.tab
    }

    #[cfg(test)]
    pub fn relay(&self) -> &RelayContext {
        &self.relay_ctx
    }

    #[cfg(test)]
    pub fn windows(&self) -> &NamedWindows {
        &self.windows
    }

    pub fn shutdown(&self) {
        self.relay_ctx.unload();
        self.tab.unload();
        tracing::info!(
            tabs_opened = self.windows.opened(),
            pending = self.relay_ctx.pending_count(),
            "Bridge stopped"
        );
    }
}
