//! Content hash shown next to a typed-data signature.

use sha3::{Digest, Keccak256};
use wcbridge_common::protocol::SignTypedDataParams;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// EIP-712 signing digest: `keccak256(0x19 0x01 ‖ domainSeparator ‖ hashStruct)`.
pub fn eip712_digest(domain_separator: &[u8; 32], hash_struct: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain_separator);
    hasher.update(hash_struct);
    hasher.finalize().into()
}

fn decode_word(text: &str) -> Option<[u8; 32]> {
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text).ok()?.try_into().ok()
}

/// Hash of the typed data a signature was requested for, as `0x`-hex.
///
/// Uses the EIP-712 digest when both precomputed components are valid
/// 32-byte words; otherwise falls back to keccak-256 of the typed-data
/// JSON text.
pub fn typed_data_hash(params: &SignTypedDataParams) -> String {
    let domain = params.domain_separator_hex.as_deref().and_then(decode_word);
    let message = params.hash_struct_message_hex.as_deref().and_then(decode_word);
    let digest = match (domain, message) {
        (Some(domain), Some(message)) => eip712_digest(&domain, &message),
        _ => {
            let text = match &params.typed_data {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            keccak256(text.as_bytes())
        }
    };
    format!("0x{}", hex::encode(digest))
}
