use serde::{Deserialize, Serialize};

use crate::id::RelayId;

/// Wire value of the `target` field on readiness signals.
pub const TAB_STATUS_TARGET: &str = "tab-status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTarget {
    #[serde(rename = "tab-status")]
    TabStatus,
}

/// Readiness signal. Sent by the tab controller, and by a relay when it
/// unloads (then `relay` names the sender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabStatus {
    pub target: StatusTarget,
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay: Option<RelayId>,
}

impl TabStatus {
    pub fn ready() -> Self {
        Self::tab(true)
    }

    pub fn unready() -> Self {
        Self::tab(false)
    }

    fn tab(ready: bool) -> Self {
        Self {
            target: StatusTarget::TabStatus,
            ready,
            relay: None,
        }
    }

    /// The signal a relay broadcasts as it goes away.
    pub fn relay_gone(relay: RelayId) -> Self {
        Self {
            target: StatusTarget::TabStatus,
            ready: false,
            relay: Some(relay),
        }
    }

    pub fn is_from_tab(&self) -> bool {
        self.relay.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tab_status_wire_format() {
        assert_eq!(
            serde_json::to_value(TabStatus::ready()).unwrap(),
            json!({ "target": "tab-status", "ready": true })
        );
        assert_eq!(
            serde_json::to_value(TabStatus::unready()).unwrap(),
            json!({ "target": "tab-status", "ready": false })
        );
    }

    #[test]
    fn relay_gone_names_relay() {
        let status = TabStatus::relay_gone(RelayId::from("r1"));
        assert!(!status.is_from_tab());
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({ "target": "tab-status", "ready": false, "relay": "r1" })
        );
    }

    #[test]
    fn parses_plain_status() {
        let status: TabStatus =
            serde_json::from_value(json!({ "target": "tab-status", "ready": true })).unwrap();
        assert!(status.ready);
        assert!(status.is_from_tab());
    }
}
