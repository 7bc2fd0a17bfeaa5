//! Outgoing transfer handlers (lock side).
//!
//! Custody is atomic with the call: native funds arrive attached to the
//! message, CW20 funds arrive via the `Send` that triggered `Receive`.
//! On any validation error the whole transaction reverts and no funds
//! move.

use cosmwasm_std::{
    from_json, to_json_binary, Addr, BankMsg, Coin, CosmosMsg, DepsMut, Env, MessageInfo,
    Response, Uint128, WasmMsg,
};
use cw20::{Cw20ExecuteMsg, Cw20ReceiveMsg};

use crate::error::ContractError;
use crate::fee::fee_and_net;
use crate::hash::{
    bytes32_to_hex, compute_message_id, encode_address, encode_native_denom, encode_recipient,
};
use crate::msg::ReceiveMsg;
use crate::state::{
    OutgoingTransfer, CHAIN_CONFIGS, CONFIG, LOCKED_BALANCES, OUTGOING_NONCE, STATS,
    SUPPORTED_TOKENS, TRANSFERS,
};

/// Lock attached native funds for bridging.
pub fn execute_bridge_native(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    target_chain_id: u64,
    recipient: String,
) -> Result<Response, ContractError> {
    if info.funds.is_empty() {
        return Err(ContractError::NoFunds);
    }
    if info.funds.len() > 1 {
        return Err(ContractError::MultipleDenoms);
    }
    let coin = info.funds[0].clone();

    do_bridge(
        deps,
        env,
        info.sender,
        coin.denom,
        coin.amount,
        target_chain_id,
        recipient,
        true,
    )
}

/// CW20 entry point. The sending contract is the token being bridged.
pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    wrapper: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let msg: ReceiveMsg = from_json(&wrapper.msg)?;
    let user = deps.api.addr_validate(&wrapper.sender)?;
    let token = info.sender.to_string();

    match msg {
        ReceiveMsg::Bridge {
            target_chain_id,
            recipient,
        } => do_bridge(
            deps,
            env,
            user,
            token,
            wrapper.amount,
            target_chain_id,
            recipient,
            false,
        ),
    }
}

/// Shared lock path for both custody modes.
#[allow(clippy::too_many_arguments)]
fn do_bridge(
    deps: DepsMut,
    env: Env,
    sender: Addr,
    token: String,
    amount: Uint128,
    target_chain_id: u64,
    recipient: String,
    is_native: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    let chain_config = CHAIN_CONFIGS
        .may_load(deps.storage, target_chain_id)?
        .ok_or(ContractError::ChainNotSupported {
            chain_id: target_chain_id,
        })?;
    if !chain_config.enabled {
        return Err(ContractError::ChainDisabled {
            chain_id: target_chain_id,
        });
    }

    let supported = SUPPORTED_TOKENS
        .may_load(deps.storage, (config.this_chain_id, token.as_str()))?
        .unwrap_or(false);
    if !supported {
        return Err(ContractError::TokenNotSupported {
            chain_id: config.this_chain_id,
            token,
        });
    }

    // Bounds are inclusive on both ends
    if amount < chain_config.min_amount {
        return Err(ContractError::BelowMinimumAmount {
            amount,
            min_amount: chain_config.min_amount,
        });
    }
    if amount > chain_config.max_amount {
        return Err(ContractError::AboveMaximumAmount {
            amount,
            max_amount: chain_config.max_amount,
        });
    }

    let (fee, net_amount) = fee_and_net(amount, &chain_config)?;

    let nonce = OUTGOING_NONCE.load(deps.storage)?;
    OUTGOING_NONCE.save(deps.storage, &(nonce + 1))?;

    let token_bytes = if is_native {
        encode_native_denom(&token)
    } else {
        encode_address(deps.as_ref(), &Addr::unchecked(&token))?
    };
    let sender_bytes = encode_address(deps.as_ref(), &sender)?;
    let recipient_bytes = encode_recipient(&recipient);
    let timestamp = env.block.time.seconds();

    let message_id = compute_message_id(
        config.this_chain_id,
        target_chain_id,
        &token_bytes,
        &sender_bytes,
        &recipient_bytes,
        net_amount.u128(),
        timestamp,
        nonce,
    );
    let message_id_hex = bytes32_to_hex(&message_id);

    let locked = LOCKED_BALANCES
        .may_load(deps.storage, token.as_str())?
        .unwrap_or_default();
    LOCKED_BALANCES.save(deps.storage, token.as_str(), &(locked + net_amount))?;

    TRANSFERS.save(
        deps.storage,
        nonce,
        &OutgoingTransfer {
            nonce,
            message_id: message_id_hex.clone(),
            sender: sender.clone(),
            recipient: recipient.clone(),
            token: token.clone(),
            amount,
            fee,
            net_amount,
            target_chain_id,
            timestamp: env.block.time,
        },
    )?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_outgoing += 1;
    stats.total_fees_collected += fee;
    STATS.save(deps.storage, &stats)?;

    let mut response = Response::new()
        .add_attribute("method", "bridge")
        .add_attribute("message_id", message_id_hex)
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("sender", sender)
        .add_attribute("recipient", recipient)
        .add_attribute("token", token.clone())
        .add_attribute("amount", amount.to_string())
        .add_attribute("fee", fee.to_string())
        .add_attribute("net_amount", net_amount.to_string())
        .add_attribute("target_chain_id", target_chain_id.to_string());

    if !fee.is_zero() {
        let fee_msg: CosmosMsg = if is_native {
            BankMsg::Send {
                to_address: config.fee_collector.to_string(),
                amount: vec![Coin {
                    denom: token,
                    amount: fee,
                }],
            }
            .into()
        } else {
            WasmMsg::Execute {
                contract_addr: token,
                msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                    recipient: config.fee_collector.to_string(),
                    amount: fee,
                })?,
                funds: vec![],
            }
            .into()
        };
        response = response.add_message(fee_msg);
    }

    Ok(response)
}
