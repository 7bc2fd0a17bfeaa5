//! Message types for the bridge ledger contract.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Uint128};
use cw20::Cw20ReceiveMsg;

use crate::state::{ChainConfig, OutgoingTransfer, Stats};

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the instantiator when unset.
    pub owner: Option<String>,
    pub fee_collector: String,
    /// Chain id of the chain this contract is deployed on.
    pub this_chain_id: u64,
    /// Initial relay operators allowed to submit claims.
    pub operators: Vec<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Lock attached native funds for bridging to `target_chain_id`.
    Bridge {
        target_chain_id: u64,
        /// Recipient address on the target chain.
        recipient: String,
    },
    /// CW20 entry point; the wrapped msg must be [`ReceiveMsg::Bridge`].
    Receive(Cw20ReceiveMsg),
    /// Release locked funds for a transfer observed on a source chain.
    /// Operator-or-owner only; each message identity is claimable once.
    Claim {
        /// 32-byte message identity.
        message_id: Binary,
        recipient: String,
        amount: Uint128,
        token: String,
        source_chain_id: u64,
    },
    /// Register or replace the configuration for a destination chain.
    SetChainConfig {
        chain_id: u64,
        min_amount: Uint128,
        max_amount: Uint128,
        fee_bps: u32,
        fixed_fee: Uint128,
        enabled: bool,
    },
    /// Mark a token as bridgeable (or not) for a chain.
    SetSupportedToken {
        chain_id: u64,
        token: String,
        supported: bool,
    },
    AddOperator { operator: String },
    RemoveOperator { operator: String },
    Pause {},
    Unpause {},
    TransferOwnership { new_owner: String },
    /// Emergency extraction of CW20 funds held by the contract.
    Withdraw {
        token: String,
        amount: Uint128,
        recipient: String,
    },
    /// Emergency extraction of native funds held by the contract.
    WithdrawNative {
        denom: String,
        amount: Uint128,
        recipient: String,
    },
}

/// Messages embedded in a CW20 `Send`.
#[cw_serde]
pub enum ReceiveMsg {
    Bridge {
        target_chain_id: u64,
        recipient: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(ChainConfigResponse)]
    ChainConfig { chain_id: u64 },
    #[returns(ChainConfigsResponse)]
    ChainConfigs {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(TokenSupportResponse)]
    IsTokenSupported { chain_id: u64, token: String },
    /// Quote the fee for bridging `amount` to `target_chain_id` without
    /// executing a transfer.
    #[returns(CalculateFeeResponse)]
    CalculateFee {
        amount: Uint128,
        target_chain_id: u64,
    },
    #[returns(ProcessedResponse)]
    IsProcessed { message_id: Binary },
    #[returns(LockedBalanceResponse)]
    LockedBalance { token: String },
    #[returns(NonceResponse)]
    CurrentNonce {},
    #[returns(TransferResponse)]
    Transfer { nonce: u64 },
    #[returns(OperatorsResponse)]
    Operators {},
    #[returns(StatsResponse)]
    Stats {},
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub paused: bool,
    pub fee_collector: Addr,
    pub this_chain_id: u64,
}

#[cw_serde]
pub struct ChainConfigResponse {
    pub config: Option<ChainConfig>,
}

#[cw_serde]
pub struct ChainConfigsResponse {
    pub configs: Vec<ChainConfig>,
}

#[cw_serde]
pub struct TokenSupportResponse {
    pub supported: bool,
}

#[cw_serde]
pub struct CalculateFeeResponse {
    pub fee: Uint128,
    /// None when the fee would consume the whole amount.
    pub net_amount: Option<Uint128>,
}

#[cw_serde]
pub struct ProcessedResponse {
    pub processed: bool,
}

#[cw_serde]
pub struct LockedBalanceResponse {
    pub token: String,
    pub balance: Uint128,
}

#[cw_serde]
pub struct NonceResponse {
    pub nonce: u64,
}

#[cw_serde]
pub struct TransferResponse {
    pub transfer: Option<OutgoingTransfer>,
}

#[cw_serde]
pub struct OperatorsResponse {
    pub operators: Vec<Addr>,
}

#[cw_serde]
pub struct StatsResponse {
    pub stats: Stats,
}
