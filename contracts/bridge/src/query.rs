//! Query handlers.

use cosmwasm_std::{Binary, Deps, Order, StdResult, Uint128};
use cw_storage_plus::Bound;

use crate::fee::calculate_fee;
use crate::msg::{
    CalculateFeeResponse, ChainConfigResponse, ChainConfigsResponse, ConfigResponse,
    LockedBalanceResponse, NonceResponse, OperatorsResponse, ProcessedResponse, StatsResponse,
    TokenSupportResponse, TransferResponse,
};
use crate::state::{
    CHAIN_CONFIGS, CONFIG, LOCKED_BALANCES, OPERATORS, OUTGOING_NONCE, PROCESSED_MESSAGES, STATS,
    SUPPORTED_TOKENS, TRANSFERS,
};

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        paused: config.paused,
        fee_collector: config.fee_collector,
        this_chain_id: config.this_chain_id,
    })
}

pub fn query_chain_config(deps: Deps, chain_id: u64) -> StdResult<ChainConfigResponse> {
    let config = CHAIN_CONFIGS.may_load(deps.storage, chain_id)?;
    Ok(ChainConfigResponse { config })
}

pub fn query_chain_configs(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<ChainConfigsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let configs = CHAIN_CONFIGS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, config)| config))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(ChainConfigsResponse { configs })
}

pub fn query_is_token_supported(
    deps: Deps,
    chain_id: u64,
    token: &str,
) -> StdResult<TokenSupportResponse> {
    let supported = SUPPORTED_TOKENS
        .may_load(deps.storage, (chain_id, token))?
        .unwrap_or(false);
    Ok(TokenSupportResponse { supported })
}

/// Pure fee quote against the stored chain config. Mirrors exactly what
/// `Bridge` will charge, including the fee-exceeds-amount rejection
/// (surfaced as `net_amount: None`).
pub fn query_calculate_fee(
    deps: Deps,
    amount: Uint128,
    target_chain_id: u64,
) -> StdResult<CalculateFeeResponse> {
    let chain_config = CHAIN_CONFIGS.load(deps.storage, target_chain_id)?;
    let fee = calculate_fee(amount, &chain_config);
    let net_amount = amount.checked_sub(fee).ok().filter(|net| !net.is_zero());
    Ok(CalculateFeeResponse { fee, net_amount })
}

pub fn query_is_processed(deps: Deps, message_id: &Binary) -> StdResult<ProcessedResponse> {
    let processed = PROCESSED_MESSAGES.has(deps.storage, message_id.as_slice());
    Ok(ProcessedResponse { processed })
}

pub fn query_locked_balance(deps: Deps, token: String) -> StdResult<LockedBalanceResponse> {
    let balance = LOCKED_BALANCES
        .may_load(deps.storage, token.as_str())?
        .unwrap_or_default();
    Ok(LockedBalanceResponse { token, balance })
}

pub fn query_current_nonce(deps: Deps) -> StdResult<NonceResponse> {
    let nonce = OUTGOING_NONCE.load(deps.storage)?;
    Ok(NonceResponse { nonce })
}

pub fn query_transfer(deps: Deps, nonce: u64) -> StdResult<TransferResponse> {
    let transfer = TRANSFERS.may_load(deps.storage, nonce)?;
    Ok(TransferResponse { transfer })
}

pub fn query_operators(deps: Deps) -> StdResult<OperatorsResponse> {
    let operators = OPERATORS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    Ok(OperatorsResponse { operators })
}

pub fn query_stats(deps: Deps) -> StdResult<StatsResponse> {
    let stats = STATS.load(deps.storage)?;
    Ok(StatsResponse { stats })
}
