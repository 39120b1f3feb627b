//! Observable tab state.

use serde::Serialize;

use crate::display::CallResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Everything the tab UI renders. Published through a watch channel; only
/// the controller writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub lifecycle: Lifecycle,
    pub accounts: Vec<String>,
    pub chain_id: u64,
    pub address: Option<String>,
    pub pending_request: bool,
    pub show_modal: bool,
    pub result: Option<CallResult>,
}

impl TabSnapshot {
    pub fn initial(chain_id: u64) -> Self {
        Self {
            lifecycle: Lifecycle::Disconnected,
            accounts: Vec::new(),
            chain_id,
            address: None,
            pending_request: false,
            show_modal: false,
            result: None,
        }
    }

    pub fn connected(&self) -> bool {
        self.lifecycle == Lifecycle::Connected
    }

    pub(crate) fn set_accounts(&mut self, accounts: Vec<String>, chain_id: u64) {
        self.address = accounts.first().cloned();
        self.accounts = accounts;
        self.chain_id = chain_id;
    }
}

impl Default for TabSnapshot {
    fn default() -> Self {
        Self::initial(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_disconnected() {
        let snap = TabSnapshot::default();
        assert_eq!(snap.lifecycle, Lifecycle::Disconnected);
        assert_eq!(snap.chain_id, 1);
        assert!(!snap.connected());
        assert!(!snap.pending_request);
        assert!(snap.result.is_none());
    }

    #[test]
    fn set_accounts_takes_first_as_address() {
        let mut snap = TabSnapshot::default();
        snap.set_accounts(vec!["0xAA".into(), "0xBB".into()], 5);
        assert_eq!(snap.address.as_deref(), Some("0xAA"));
        assert_eq!(snap.chain_id, 5);

        snap.set_accounts(Vec::new(), 5);
        assert_eq!(snap.address, None);
    }
}
