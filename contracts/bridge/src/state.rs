//! Storage layout for the bridge ledger contract.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

/// Contract name and version, stamped via cw2 on instantiate/migrate.
pub const CONTRACT_NAME: &str = "crates.io:bridge-ledger";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Global contract configuration.
#[cw_serde]
pub struct Config {
    /// Contract owner (chain registry, token registry, pause, withdrawals).
    pub owner: Addr,
    /// When true all value-moving operations are rejected.
    pub paused: bool,
    /// Receiver of collected bridge fees.
    pub fee_collector: Addr,
    /// Chain id of the chain this contract is deployed on. Used as the
    /// origin chain in message identities and as the key for local token
    /// support lookups.
    pub this_chain_id: u64,
}

/// Per-destination-chain bridging parameters.
///
/// A chain with no entry here cannot be bridged to. `set_chain_config`
/// replaces the whole entry, there is no field-level merge.
#[cw_serde]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Inclusive lower bound on the gross bridged amount.
    pub min_amount: Uint128,
    /// Inclusive upper bound on the gross bridged amount.
    pub max_amount: Uint128,
    /// Percentage fee in basis points, at most 10_000 (100%).
    pub fee_bps: u32,
    /// Flat fee added on top of the percentage fee.
    pub fixed_fee: Uint128,
    /// Disabled chains keep their configuration but reject transfers.
    pub enabled: bool,
}

/// An outgoing transfer as recorded at lock time.
#[cw_serde]
pub struct OutgoingTransfer {
    pub nonce: u64,
    /// keccak-256 message identity, hex encoded.
    pub message_id: String,
    pub sender: Addr,
    /// Recipient address on the target chain, as supplied by the sender.
    pub recipient: String,
    /// Token identifier: CW20 contract address or native denom.
    pub token: String,
    pub amount: Uint128,
    pub fee: Uint128,
    pub net_amount: Uint128,
    pub target_chain_id: u64,
    pub timestamp: Timestamp,
}

/// Lifetime counters.
#[cw_serde]
pub struct Stats {
    pub total_outgoing: u64,
    pub total_claims: u64,
    pub total_fees_collected: Uint128,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// Destination chain registry, keyed by chain id.
pub const CHAIN_CONFIGS: Map<u64, ChainConfig> = Map::new("chain_configs");

/// Token support registry, keyed by (chain id, token identifier).
pub const SUPPORTED_TOKENS: Map<(u64, &str), bool> = Map::new("supported_tokens");

/// Consumed 32-byte message identities. An identity present here can
/// never be claimed again.
pub const PROCESSED_MESSAGES: Map<&[u8], bool> = Map::new("processed_messages");

/// Per-token custody ledger of locked funds awaiting claims.
pub const LOCKED_BALANCES: Map<&str, Uint128> = Map::new("locked_balances");

/// Monotonically increasing counter folded into every message identity.
pub const OUTGOING_NONCE: Item<u64> = Item::new("outgoing_nonce");

/// Outgoing transfers by nonce, retained for relay queries.
pub const TRANSFERS: Map<u64, OutgoingTransfer> = Map::new("transfers");

/// Relay operators allowed to submit claims.
pub const OPERATORS: Map<&Addr, bool> = Map::new("operators");

pub const STATS: Item<Stats> = Item::new("stats");
