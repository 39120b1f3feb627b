//! Command names understood by the tab controller.

use serde::{Deserialize, Serialize};
use std::fmt;

const CONNECTION_CHECK: &str = "walletconnect-connection-check";
const UNLOCK: &str = "walletconnect-unlock";
const SIGN_TRANSACTION: &str = "walletconnect-sign-transaction";
const SIGN_PERSONAL_MESSAGE: &str = "walletconnect-sign-personal-message";
const SIGN_TYPED_DATA: &str = "walletconnect-sign-typed-data";

/// Suffix appended to an action name to form its reply tag.
const REPLY_SUFFIX: &str = "-reply";

/// A command action. Unknown names survive decoding as `Unsupported` so the
/// dispatcher can answer them with an explicit rejection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    ConnectionCheck,
    Unlock,
    SignTransaction,
    SignPersonalMessage,
    SignTypedData,
    Unsupported(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ConnectionCheck => CONNECTION_CHECK,
            Self::Unlock => UNLOCK,
            Self::SignTransaction => SIGN_TRANSACTION,
            Self::SignPersonalMessage => SIGN_PERSONAL_MESSAGE,
            Self::SignTypedData => SIGN_TYPED_DATA,
            Self::Unsupported(name) => name,
        }
    }

    /// The `action` tag the matching reply carries, e.g.
    /// `walletconnect-unlock-reply`.
    pub fn reply_tag(&self) -> String {
        format!("{}{REPLY_SUFFIX}", self.as_str())
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        match name.as_str() {
            CONNECTION_CHECK => Self::ConnectionCheck,
            UNLOCK => Self::Unlock,
            SIGN_TRANSACTION => Self::SignTransaction,
            SIGN_PERSONAL_MESSAGE => Self::SignPersonalMessage,
            SIGN_TYPED_DATA => Self::SignTypedData,
            _ => Self::Unsupported(name),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Unsupported(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse() {
        assert_eq!(
            Action::from(CONNECTION_CHECK.to_string()),
            Action::ConnectionCheck
        );
        assert_eq!(Action::from(UNLOCK.to_string()), Action::Unlock);
        assert_eq!(
            Action::from(SIGN_TYPED_DATA.to_string()),
            Action::SignTypedData
        );
    }

    #[test]
    fn unknown_name_is_kept() {
        let action = Action::from("foo".to_string());
        assert_eq!(action, Action::Unsupported("foo".into()));
        assert_eq!(action.as_str(), "foo");
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(
            Action::from("WALLETCONNECT-UNLOCK".to_string()),
            Action::Unsupported("WALLETCONNECT-UNLOCK".into())
        );
    }

    #[test]
    fn reply_tag_appends_suffix() {
        assert_eq!(Action::Unlock.reply_tag(), "walletconnect-unlock-reply");
        assert_eq!(
            Action::Unsupported("foo".into()).reply_tag(),
            "foo-reply"
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Action::SignPersonalMessage).unwrap();
        assert_eq!(json, "\"walletconnect-sign-personal-message\"");
        let back: Action = serde_json::from_str("\"bar\"").unwrap();
        assert_eq!(back, Action::Unsupported("bar".into()));
    }
}
