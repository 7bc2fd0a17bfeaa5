//! Message identity computation.
//!
//! Every outgoing transfer derives a 32-byte keccak-256 identity from a
//! fixed 256-byte preimage of eight 32-byte big-endian slots:
//!
//! - Bytes 0-31:    origin chain id (u64, left-padded)
//! - Bytes 32-63:   target chain id (u64, left-padded)
//! - Bytes 64-95:   token (32-byte encoding)
//! - Bytes 96-127:  sender (32-byte encoding)
//! - Bytes 128-159: recipient (32-byte encoding)
//! - Bytes 160-191: net amount (u128, left-padded)
//! - Bytes 192-223: block timestamp seconds (u64, left-padded)
//! - Bytes 224-255: outgoing nonce (u64, left-padded)
//!
//! The nonce slot makes identities unique even when two transfers share
//! every user-visible field inside one block. The relay computes the same
//! layout off-chain to cross-check observed events.

use cosmwasm_std::{Addr, Deps, StdResult};
use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the canonical message identity for an outgoing transfer.
#[allow(clippy::too_many_arguments)]
pub fn compute_message_id(
    origin_chain_id: u64,
    target_chain_id: u64,
    token: &[u8; 32],
    sender: &[u8; 32],
    recipient: &[u8; 32],
    net_amount: u128,
    timestamp: u64,
    nonce: u64,
) -> [u8; 32] {
    let mut data = [0u8; 256];

    data[24..32].copy_from_slice(&origin_chain_id.to_be_bytes());
    data[32 + 24..64].copy_from_slice(&target_chain_id.to_be_bytes());
    data[64..96].copy_from_slice(token);
    data[96..128].copy_from_slice(sender);
    data[128..160].copy_from_slice(recipient);

    // u128 (16 bytes) into bytes 16-31 of the slot, upper bytes stay zero
    data[160 + 16..192].copy_from_slice(&net_amount.to_be_bytes());

    data[192 + 24..224].copy_from_slice(&timestamp.to_be_bytes());
    data[224 + 24..256].copy_from_slice(&nonce.to_be_bytes());

    keccak256(&data)
}

/// Encode a local address as 32 bytes.
///
/// Canonical Cosmos addresses are 20 bytes and get left-padded to match
/// EVM's bytes32 address encoding. Longer canonical forms hash down to
/// 32 bytes instead.
pub fn encode_address(deps: Deps, addr: &Addr) -> StdResult<[u8; 32]> {
    let canonical = deps.api.addr_canonicalize(addr.as_str())?;
    if canonical.len() > 32 {
        return Ok(keccak256(canonical.as_slice()));
    }
    let mut out = [0u8; 32];
    out[32 - canonical.len()..].copy_from_slice(canonical.as_slice());
    Ok(out)
}

/// Encode a native denom as 32 bytes. Denoms have no canonical byte
/// form, so they hash to a stable key.
pub fn encode_native_denom(denom: &str) -> [u8; 32] {
    keccak256(denom.as_bytes())
}

/// Encode a target-chain recipient as 32 bytes.
///
/// EVM-style `0x` + 40 hex addresses are decoded and left-padded; any
/// other format hashes to a stable key since its byte form is unknown
/// to this chain.
pub fn encode_recipient(recipient: &str) -> [u8; 32] {
    if let Some(stripped) = recipient.strip_prefix("0x") {
        if stripped.len() == 40 {
            if let Ok(bytes) = hex::decode(stripped) {
                let mut out = [0u8; 32];
                out[12..].copy_from_slice(&bytes);
                return out;
            }
        }
    }
    keccak256(recipient.as_bytes())
}

/// Hex-encode a 32-byte identity with a 0x prefix.
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 32-byte identity from raw or hex input.
pub fn parse_message_id(input: &[u8]) -> Result<[u8; 32], usize> {
    if input.len() == 32 {
        let mut out = [0u8; 32];
        out.copy_from_slice(input);
        return Ok(out);
    }
    Err(input.len())
}
