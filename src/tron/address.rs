//! Tron address codec.
//!
//! Tron addresses are 21-byte payloads, a fixed `0x41` network prefix
//! followed by the same 20 account bytes EVM chains use, rendered as
//! Base58Check. The codec bridges the three forms in circulation: canonical
//! base58 (`T...`), prefixed hex (`41...`), and the bare EVM hex form used
//! by the JSON-RPC endpoint.

use crate::error::{ChainError, ChainResult};
use ethers::types::Address;

/// Network prefix byte of mainnet addresses.
pub(crate) const ADDRESS_PREFIX: u8 = 0x41;

/// Byte length of a prefixed address payload.
const PAYLOAD_LENGTH: usize = 21;

/// Returns the 21-byte prefixed payload of an account address.
pub(crate) fn prefixed_payload(address: Address) -> Vec<u8> {
    let mut payload = Vec::with_capacity(PAYLOAD_LENGTH);
    payload.push(ADDRESS_PREFIX);
    payload.extend_from_slice(address.as_bytes());
    payload
}

/// Renders an account address in canonical Base58Check form.
pub(crate) fn to_base58(address: Address) -> String {
    bs58::encode(prefixed_payload(address)).with_check().into_string()
}

/// Renders an account address as prefixed hex, the form the wallet REST API
/// exchanges.
pub(crate) fn to_tron_hex(address: Address) -> String {
    hex::encode(prefixed_payload(address))
}

/// Decodes a canonical Base58Check address.
///
/// # Errors
///
/// Returns [`ChainError::Configuration`] on a checksum failure, a wrong
/// network prefix, or a payload that is not 21 bytes.
pub(crate) fn from_base58(address: &str) -> ChainResult<Address> {
    let payload = bs58::decode(address)
        .with_check(Some(ADDRESS_PREFIX))
        .into_vec()
        .map_err(|e| ChainError::configuration(format!("invalid Tron address {address}: {e}")))?;
    match payload.split_first() {
        Some((&ADDRESS_PREFIX, account)) if account.len() == PAYLOAD_LENGTH - 1 => {
            Ok(Address::from_slice(account))
        }
        _ => Err(ChainError::configuration(format!(
            "invalid Tron address payload length: {address}"
        ))),
    }
}

/// Parses any accepted address form into the 20-byte account form.
///
/// Accepts canonical base58, prefixed hex (21 bytes, `0x41` first), and the
/// bare 20-byte hex form with or without a `0x` prefix.
///
/// # Errors
///
/// Returns [`ChainError::Configuration`] when the input matches none of the
/// accepted forms.
pub(crate) fn parse(address: &str) -> ChainResult<Address> {
    if address.is_empty() {
        return Err(ChainError::configuration("empty Tron address"));
    }
    let bare = address.strip_prefix("0x").unwrap_or(address);
    let hex_form = address.starts_with("0x")
        || (matches!(bare.len(), 40 | 42) && bare.bytes().all(|b| b.is_ascii_hexdigit()));
    if hex_form {
        return from_hex(bare);
    }
    from_base58(address)
}

fn from_hex(bare: &str) -> ChainResult<Address> {
    let bytes = hex::decode(bare)
        .map_err(|e| ChainError::configuration(format!("invalid Tron address hex: {e}")))?;
    match bytes.split_first() {
        Some((&ADDRESS_PREFIX, account)) if account.len() == PAYLOAD_LENGTH - 1 => {
            Ok(Address::from_slice(account))
        }
        _ if bytes.len() == PAYLOAD_LENGTH - 1 => Ok(Address::from_slice(&bytes)),
        _ => Err(ChainError::configuration(format!(
            "Tron address hex must be 20 bytes or 0x41-prefixed 21 bytes, got {}",
            bytes.len()
        ))),
    }
}

/// Returns true for a well-formed canonical address that is not the zero
/// (native asset) payload.
pub(crate) fn is_valid(address: &str) -> bool {
    from_base58(address)
        .map(|account| !account.is_zero())
        .unwrap_or(false)
}
