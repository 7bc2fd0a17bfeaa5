//! Message identity computation, mirroring the bridge contract.
//!
//! The contract hashes a fixed 256-byte preimage of eight 32-byte
//! big-endian slots:
//! `origin_chain_id | target_chain_id | token | sender | recipient |
//! net_amount | timestamp | nonce`.
//! The same layout lives here so operators and tooling can derive
//! identities off-chain without querying the contract.

use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the canonical message identity for a transfer.
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
    data[160 + 16..192].copy_from_slice(&net_amount.to_be_bytes());
    data[192 + 24..224].copy_from_slice(&timestamp.to_be_bytes());
    data[224 + 24..256].copy_from_slice(&nonce.to_be_bytes());

    keccak256(&data)
}

/// Hex-encode a 32-byte identity with a 0x prefix.
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 32-byte identity from a hex string (with or without 0x).
pub fn hex_to_bytes32(s: &str) -> eyre::Result<[u8; 32]> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped)?;
    if bytes.len() != 32 {
        eyre::bail!("expected 32 bytes, got {}", bytes.len());
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}
