//! Records of completed calls, as shown in the approval modal.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method")]
pub enum CallResult {
    #[serde(rename = "eth_signTransaction")]
    SignTransaction {
        from: String,
        to: String,
        value: String,
        result: String,
    },
    #[serde(rename = "personal_sign")]
    PersonalSign {
        address: String,
        valid: bool,
        result: String,
    },
    #[serde(rename = "eth_signTypedData")]
    SignTypedData {
        address: String,
        valid: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        hash: Option<String>,
        result: String,
    },
}

impl CallResult {
    pub fn method(&self) -> &'static str {
        match self {
            Self::SignTransaction { .. } => "eth_signTransaction",
            Self::PersonalSign { .. } => "personal_sign",
            Self::SignTypedData { .. } => "eth_signTypedData",
        }
    }
}
