//! Entry points and message dispatch.

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{
    Config, Stats, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, OPERATORS, OUTGOING_NONCE, STATS,
};

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = match msg.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => info.sender,
    };
    let fee_collector = deps.api.addr_validate(&msg.fee_collector)?;

    CONFIG.save(
        deps.storage,
        &Config {
            owner: owner.clone(),
            paused: false,
            fee_collector,
            this_chain_id: msg.this_chain_id,
        },
    )?;
    OUTGOING_NONCE.save(deps.storage, &0)?;
    STATS.save(
        deps.storage,
        &Stats {
            total_outgoing: 0,
            total_claims: 0,
            total_fees_collected: Uint128::zero(),
        },
    )?;

    for operator in msg.operators {
        let addr = deps.api.addr_validate(&operator)?;
        OPERATORS.save(deps.storage, &addr, &true)?;
    }

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", owner)
        .add_attribute("this_chain_id", msg.this_chain_id.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Bridge {
            target_chain_id,
            recipient,
        } => execute::execute_bridge_native(deps, env, info, target_chain_id, recipient),
        ExecuteMsg::Receive(wrapper) => execute::execute_receive(deps, env, info, wrapper),
        ExecuteMsg::Claim {
            message_id,
            recipient,
            amount,
            token,
            source_chain_id,
        } => execute::execute_claim(
            deps,
            info,
            message_id,
            recipient,
            amount,
            token,
            source_chain_id,
        ),
        ExecuteMsg::SetChainConfig {
            chain_id,
            min_amount,
            max_amount,
            fee_bps,
            fixed_fee,
            enabled,
        } => execute::execute_set_chain_config(
            deps, info, chain_id, min_amount, max_amount, fee_bps, fixed_fee, enabled,
        ),
        ExecuteMsg::SetSupportedToken {
            chain_id,
            token,
            supported,
        } => execute::execute_set_supported_token(deps, info, chain_id, token, supported),
        ExecuteMsg::AddOperator { operator } => execute::execute_add_operator(deps, info, operator),
        ExecuteMsg::RemoveOperator { operator } => {
            execute::execute_remove_operator(deps, info, operator)
        }
        ExecuteMsg::Pause {} => execute::execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute::execute_unpause(deps, info),
        ExecuteMsg::TransferOwnership { new_owner } => {
            execute::execute_transfer_ownership(deps, info, new_owner)
        }
        ExecuteMsg::Withdraw {
            token,
            amount,
            recipient,
        } => execute::execute_withdraw(deps, info, token, amount, recipient),
        ExecuteMsg::WithdrawNative {
            denom,
            amount,
            recipient,
        } => execute::execute_withdraw_native(deps, info, denom, amount, recipient),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query::query_config(deps)?),
        QueryMsg::ChainConfig { chain_id } => {
            to_json_binary(&query::query_chain_config(deps, chain_id)?)
        }
        QueryMsg::ChainConfigs { start_after, limit } => {
            to_json_binary(&query::query_chain_configs(deps, start_after, limit)?)
        }
        QueryMsg::IsTokenSupported { chain_id, token } => {
            to_json_binary(&query::query_is_token_supported(deps, chain_id, &token)?)
        }
        QueryMsg::CalculateFee {
            amount,
            target_chain_id,
        } => to_json_binary(&query::query_calculate_fee(deps, amount, target_chain_id)?),
        QueryMsg::IsProcessed { message_id } => {
            to_json_binary(&query::query_is_processed(deps, &message_id)?)
        }
        QueryMsg::LockedBalance { token } => {
            to_json_binary(&query::query_locked_balance(deps, token)?)
        }
        QueryMsg::CurrentNonce {} => to_json_binary(&query::query_current_nonce(deps)?),
        QueryMsg::Transfer { nonce } => to_json_binary(&query::query_transfer(deps, nonce)?),
        QueryMsg::Operators {} => to_json_binary(&query::query_operators(deps)?),
        QueryMsg::Stats {} => to_json_binary(&query::query_stats(deps)?),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("method", "migrate"))
}
