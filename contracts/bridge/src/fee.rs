//! Fee math for outgoing transfers.
//!
//! `fee = floor(amount * fee_bps / 10_000) + fixed_fee`, all integer
//! arithmetic. The relay carries the same formula over `u128` so quoted
//! and charged fees cannot diverge.

use cosmwasm_std::Uint128;

use crate::error::ContractError;
use crate::state::ChainConfig;

/// Basis point denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Maximum allowed percentage fee.
pub const MAX_FEE_BPS: u32 = 10_000;

/// Compute the total fee for a gross amount under the given chain config.
///
/// `multiply_ratio` computes the full-width product before dividing, so
/// large amounts cannot overflow, and division truncates toward zero.
pub fn calculate_fee(amount: Uint128, config: &ChainConfig) -> Uint128 {
    let percentage_fee = amount.multiply_ratio(config.fee_bps as u128, BPS_DENOMINATOR);
    percentage_fee + config.fixed_fee
}

/// Compute fee and net amount, rejecting transfers where the fee would
/// consume the whole amount or more. Never wraps.
pub fn fee_and_net(
    amount: Uint128,
    config: &ChainConfig,
) -> Result<(Uint128, Uint128), ContractError> {
    let fee = calculate_fee(amount, config);
    let net_amount = amount
        .checked_sub(fee)
        .map_err(|_| ContractError::FeeExceedsAmount { amount, fee })?;
    if net_amount.is_zero() {
        return Err(ContractError::FeeExceedsAmount { amount, fee });
    }
    Ok((fee, net_amount))
}
