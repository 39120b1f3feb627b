//! Command and reply envelopes.

use serde::{Deserialize, Serialize};

use super::action::Action;
use crate::id::{RelayId, RequestId};

/// Routing phase of a command envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Extension -> iframe relay (window message).
    #[serde(rename = "WC-IFRAME")]
    Iframe,
    /// Iframe relay -> tab controller (broadcast).
    #[serde(rename = "WC-TAB")]
    Tab,
}

/// A command travelling from the extension to the tab controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub target: Target,
    pub action: Action,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay: Option<RelayId>,
}

impl CommandEnvelope {
    pub fn new(target: Target, action: Action, params: serde_json::Value) -> Self {
        Self {
            target,
            action,
            params,
            id: None,
            relay: None,
        }
    }

    /// The readiness ping a relay sends while waiting for the tab.
    pub fn ping(relay: RelayId) -> Self {
        Self {
            relay: Some(relay),
            ..Self::new(Target::Tab, Action::ConnectionCheck, serde_json::Value::Null)
        }
    }

    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_relay(mut self, relay: RelayId) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Move the envelope to the next routing phase.
    pub fn relabel(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn reply_tag(&self) -> String {
        self.action.reply_tag()
    }
}

/// Reply body: signature, account list, or error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyPayload {
    Sig { sig: String },
    Accounts { accounts: Vec<String> },
    Error { error: String },
}

/// A reply travelling from the tab controller back to the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub action: String,
    pub success: bool,
    pub payload: ReplyPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay: Option<RelayId>,
}

impl ReplyEnvelope {
    /// Successful reply to `command`.
    pub fn ok(command: &CommandEnvelope, payload: ReplyPayload) -> Self {
        Self::answer(command, true, payload)
    }

    /// Failed reply to `command` carrying a human-readable message.
    pub fn error(command: &CommandEnvelope, message: impl Into<String>) -> Self {
        Self::answer(
            command,
            false,
            ReplyPayload::Error {
                error: message.into(),
            },
        )
    }

    fn answer(command: &CommandEnvelope, success: bool, payload: ReplyPayload) -> Self {
        Self {
            action: command.reply_tag(),
            success,
            payload,
            id: command.id.clone(),
            relay: command.relay.clone(),
        }
    }

    /// Whether this reply is tagged as the answer to `action`.
    pub fn answers(&self, action: &Action) -> bool {
        self.action == action.reply_tag()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            ReplyPayload::Error { error } => Some(error),
            _ => None,
        }
    }
}
