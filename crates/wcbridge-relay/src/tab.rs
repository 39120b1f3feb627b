//! Opening, reusing and focusing the bridge tab.

use std::sync::Arc;

use wcbridge_channel::{TabWindow, BLANK_LOCATION};
use wcbridge_common::RelayError;

use crate::context::RelayContext;

impl RelayContext {
    /// Return the bridge tab, opening it on first use.
    ///
    /// A freshly opened tab (still on `about:blank`) is navigated to the
    /// configured URL. The tab is focused on every call. A memoized tab that
    /// has been closed is forgotten and the readiness flag drops with it.
    pub fn resolve_tab(&self) -> Result<Arc<dyn TabWindow>, RelayError> {
        let name = self.settings.tab_name.as_str();
        let mut tabs = self.tabs.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(tab) = tabs.get(name) {
            if !tab.is_closed() {
                tab.focus();
                return Ok(tab.clone());
            }
            tracing::info!(relay = %self.id, tab = name, "Bridge tab was closed, reopening");
            tabs.remove(name);
            self.set_tab_ready(false);
        }

        let tab = self
            .opener
            .open_named(name)
            .map_err(|e| RelayError::TabOpen(e.to_string()))?;
        if tab.location() == BLANK_LOCATION {
            tracing::debug!(tab = name, url = %self.settings.tab_url, "Navigating new tab");
            tab.navigate(&self.settings.tab_url);
        }
        tab.focus();
        tabs.insert(name.to_string(), tab.clone());
        Ok(tab)
    }
}
