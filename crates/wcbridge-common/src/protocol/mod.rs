//! Message contract between the extension, the iframe relay and the tab.
//!
//! Three shapes travel over the wire:
//! - **Command envelopes** (`target` = `WC-IFRAME` or `WC-TAB`)
//! - **Reply envelopes** (`action` = `<action>-reply`, `success`, `payload`)
//! - **Readiness signals** (`target` = `tab-status`, `ready`)
//!
//! The broadcast channel carries all three, so receivers classify each raw
//! value with [`BroadcastMessage::classify`].

use serde::Deserialize;

mod action;
mod envelope;
mod params;
mod status;

pub use action::Action;
pub use envelope::{CommandEnvelope, ReplyEnvelope, ReplyPayload, Target};
pub use params::{
    decode_params, SignPersonalMessageParams, SignTransactionParams, SignTypedDataParams,
    TxData, UnlockParams,
};
pub use status::{StatusTarget, TabStatus, TAB_STATUS_TARGET};

/// A broadcast-channel value sorted by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastMessage {
    Status(TabStatus),
    Command(CommandEnvelope),
    Reply(ReplyEnvelope),
    /// Anything that fits none of the known shapes.
    Unknown,
}

impl BroadcastMessage {
    pub fn classify(value: &serde_json::Value) -> Self {
        let target = value.get("target").and_then(|t| t.as_str());
        let parsed = match target {
            Some(TAB_STATUS_TARGET) => TabStatus::deserialize(value).map(Self::Status).ok(),
            Some(_) => CommandEnvelope::deserialize(value).map(Self::Command).ok(),
            None => ReplyEnvelope::deserialize(value).map(Self::Reply).ok(),
        };
        parsed.unwrap_or(Self::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_status() {
        let msg = BroadcastMessage::classify(&json!({ "target": "tab-status", "ready": true }));
        assert_eq!(msg, BroadcastMessage::Status(TabStatus::ready()));
    }

    #[test]
    fn classify_command() {
        let msg = BroadcastMessage::classify(&json!({
            "target": "WC-TAB",
            "action": "walletconnect-connection-check"
        }));
        assert!(matches!(
            msg,
            BroadcastMessage::Command(CommandEnvelope { action: Action::ConnectionCheck, .. })
        ));
    }

    #[test]
    fn classify_reply() {
        let msg = BroadcastMessage::classify(&json!({
            "action": "walletconnect-unlock-reply",
            "success": true,
            "payload": { "accounts": ["0xAA"] }
        }));
        assert!(matches!(msg, BroadcastMessage::Reply(r) if r.answers(&Action::Unlock)));
    }

    #[test]
    fn classify_garbage() {
        assert_eq!(BroadcastMessage::classify(&json!(42)), BroadcastMessage::Unknown);
        assert_eq!(
            BroadcastMessage::classify(&json!({ "hello": "world" })),
            BroadcastMessage::Unknown
        );
        assert_eq!(
            BroadcastMessage::classify(&json!({ "target": "tab-status" })),
            BroadcastMessage::Unknown
        );
    }
}
