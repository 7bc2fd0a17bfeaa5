//! Owner operations: pause/unpause, chain and token registries,
//! operator set, ownership transfer, and emergency withdrawals.

use cosmwasm_std::{
    to_json_binary, BankMsg, Coin, CosmosMsg, DepsMut, MessageInfo, Response, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;

use crate::error::ContractError;
use crate::fee::MAX_FEE_BPS;
use crate::state::{ChainConfig, Config, CHAIN_CONFIGS, CONFIG, OPERATORS, SUPPORTED_TOKENS};

fn ensure_owner(config: &Config, info: &MessageInfo) -> Result<(), ContractError> {
    if info.sender != config.owner {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub fn execute_pause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    config.paused = true;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("method", "pause"))
}

pub fn execute_unpause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    config.paused = false;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("method", "unpause"))
}

/// Register or fully replace the configuration for a destination chain.
#[allow(clippy::too_many_arguments)]
pub fn execute_set_chain_config(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u64,
    min_amount: Uint128,
    max_amount: Uint128,
    fee_bps: u32,
    fixed_fee: Uint128,
    enabled: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    if min_amount > max_amount {
        return Err(ContractError::InvalidChainConfig {
            reason: format!("min_amount {} exceeds max_amount {}", min_amount, max_amount),
        });
    }
    if fee_bps > MAX_FEE_BPS {
        return Err(ContractError::InvalidChainConfig {
            reason: format!("fee_bps {} exceeds {}", fee_bps, MAX_FEE_BPS),
        });
    }

    CHAIN_CONFIGS.save(
        deps.storage,
        chain_id,
        &ChainConfig {
            chain_id,
            min_amount,
            max_amount,
            fee_bps,
            fixed_fee,
            enabled,
        },
    )?;

    Ok(Response::new()
        .add_attribute("method", "set_chain_config")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("enabled", enabled.to_string()))
}

/// Idempotent token support toggle.
pub fn execute_set_supported_token(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u64,
    token: String,
    supported: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    SUPPORTED_TOKENS.save(deps.storage, (chain_id, token.as_str()), &supported)?;

    Ok(Response::new()
        .add_attribute("method", "set_supported_token")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("token", token)
        .add_attribute("supported", supported.to_string()))
}

pub fn execute_add_operator(
    deps: DepsMut,
    info: MessageInfo,
    operator: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    let addr = deps.api.addr_validate(&operator)?;
    if OPERATORS.may_load(deps.storage, &addr)?.unwrap_or(false) {
        return Err(ContractError::OperatorExists { operator });
    }
    OPERATORS.save(deps.storage, &addr, &true)?;

    Ok(Response::new()
        .add_attribute("method", "add_operator")
        .add_attribute("operator", addr))
}

pub fn execute_remove_operator(
    deps: DepsMut,
    info: MessageInfo,
    operator: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    let addr = deps.api.addr_validate(&operator)?;
    if !OPERATORS.may_load(deps.storage, &addr)?.unwrap_or(false) {
        return Err(ContractError::OperatorNotFound { operator });
    }
    OPERATORS.remove(deps.storage, &addr);

    Ok(Response::new()
        .add_attribute("method", "remove_operator")
        .add_attribute("operator", addr))
}

pub fn execute_transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    let new_owner = deps.api.addr_validate(&new_owner)?;
    config.owner = new_owner.clone();
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "transfer_ownership")
        .add_attribute("new_owner", new_owner))
}

/// Emergency extraction of CW20 funds. Bypasses the custody ledger, so
/// it is owner-only and intended for incident response.
pub fn execute_withdraw(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    recipient: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    let token_addr = deps.api.addr_validate(&token)?;
    let recipient_addr = deps.api.addr_validate(&recipient)?;

    let msg: CosmosMsg = WasmMsg::Execute {
        contract_addr: token_addr.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
            recipient: recipient_addr.to_string(),
            amount,
        })?,
        funds: vec![],
    }
    .into();

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "withdraw")
        .add_attribute("token", token_addr)
        .add_attribute("amount", amount.to_string())
        .add_attribute("recipient", recipient_addr))
}

/// Emergency extraction of native funds.
pub fn execute_withdraw_native(
    deps: DepsMut,
    info: MessageInfo,
    denom: String,
    amount: Uint128,
    recipient: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_owner(&config, &info)?;

    let recipient_addr = deps.api.addr_validate(&recipient)?;

    let msg: CosmosMsg = BankMsg::Send {
        to_address: recipient_addr.to_string(),
        amount: vec![Coin {
            denom: denom.clone(),
            amount,
        }],
    }
    .into();

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "withdraw_native")
        .add_attribute("denom", denom)
        .add_attribute("amount", amount.to_string())
        .add_attribute("recipient", recipient_addr))
}
