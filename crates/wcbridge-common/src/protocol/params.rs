//! Typed `params` payloads, one per supported action.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::action::Action;
use crate::errors::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockParams {
    #[serde(default)]
    pub addr_index: u32,
}

/// Transaction fields as the extension sends them. Quantities may arrive as
/// JSON strings or numbers; both are kept as decimal/hex text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_limit: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_price: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub nonce: Option<String>,
    // EIP-1559 fields are passed through to the signing client untouched.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_fee_per_gas: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_priority_fee_per_gas: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionParams {
    pub tx: TxData,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignPersonalMessageParams {
    pub message: String,
    #[serde(default)]
    pub address: String,
}

/// Typed data plus the hash components the extension already computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTypedDataParams {
    pub typed_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_separator_hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_struct_message_hex: Option<String>,
    #[serde(default)]
    pub address: String,
}

impl SignTypedDataParams {
    /// JSON document handed to the signing client: the typed data together
    /// with both precomputed hash components.
    pub fn signing_payload(&self) -> String {
        serde_json::json!({
            "typedData": self.typed_data,
            "domainSeparatorHex": self.domain_separator_hex,
            "hashStructMessageHex": self.hash_struct_message_hex,
        })
        .to_string()
    }
}

/// Decode the `params` of a command for `action`.
pub fn decode_params<T: DeserializeOwned>(
    action: &Action,
    params: &serde_json::Value,
) -> Result<T, ProtocolError> {
    T::deserialize(params).map_err(|e| ProtocolError::InvalidParams {
        action: action.to_string(),
        reason: e.to_string(),
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unlock_index_defaults_to_zero() {
        let p: UnlockParams = decode_params(&Action::Unlock, &json!({})).unwrap();
        assert_eq!(p.addr_index, 0);
        let p: UnlockParams = decode_params(&Action::Unlock, &json!({ "addrIndex": 3 })).unwrap();
        assert_eq!(p.addr_index, 3);
    }

    #[test]
    fn tx_quantities_accept_numbers() {
        let p: SignTransactionParams = decode_params(
            &Action::SignTransaction,
            &json!({
                "tx": { "to": "0xBB", "value": 1, "gas": "0x5208", "nonce": 7 },
                "address": "0xAA"
            }),
        )
        .unwrap();
        assert_eq!(p.tx.to.as_deref(), Some("0xBB"));
        assert_eq!(p.tx.value.as_deref(), Some("1"));
        assert_eq!(p.tx.gas.as_deref(), Some("0x5208"));
        assert_eq!(p.tx.nonce.as_deref(), Some("7"));
        assert_eq!(p.address, "0xAA");
    }

    #[test]
    fn tx_eip1559_fields_round_trip() {
        let raw = json!({
            "to": "0xBB",
            "maxFeePerGas": "0x10",
            "maxPriorityFeePerGas": "0x01"
        });
        let tx: TxData = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(tx.max_fee_per_gas.as_deref(), Some("0x10"));
        assert_eq!(serde_json::to_value(&tx).unwrap(), raw);
    }

    #[test]
    fn tx_rejects_structured_quantity() {
        let err = decode_params::<SignTransactionParams>(
            &Action::SignTransaction,
            &json!({ "tx": { "value": [1, 2] } }),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid params for walletconnect-sign-transaction"));
    }

    #[test]
    fn signing_address_is_optional() {
        let tx: SignTransactionParams =
            decode_params(&Action::SignTransaction, &json!({ "tx": {} })).unwrap();
        let personal: SignPersonalMessageParams =
            decode_params(&Action::SignPersonalMessage, &json!({ "message": "hello" })).unwrap();
        let typed: SignTypedDataParams =
            decode_params(&Action::SignTypedData, &json!({ "typedData": {} })).unwrap();
        assert_eq!(tx.address, "");
        assert_eq!(personal.address, "");
        assert_eq!(typed.address, "");
    }

    #[test]
    fn personal_message_requires_message() {
        let err = decode_params::<SignPersonalMessageParams>(
            &Action::SignPersonalMessage,
            &json!({ "address": "0xAA" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn typed_data_signing_payload_includes_components() {
        let p: SignTypedDataParams = decode_params(
            &Action::SignTypedData,
            &json!({
                "typedData": { "primaryType": "Mail" },
                "domainSeparatorHex": "0x01",
                "hashStructMessageHex": "0x02",
                "address": "0xAA"
            }),
        )
        .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&p.signing_payload()).unwrap();
        assert_eq!(payload["typedData"]["primaryType"], "Mail");
        assert_eq!(payload["domainSeparatorHex"], "0x01");
        assert_eq!(payload["hashStructMessageHex"], "0x02");
    }
}
