//! Claim handler (release side).
//!
//! The message identity is marked processed before the transfer message
//! is appended. CosmWasm executes the whole call atomically, so a failed
//! bank/CW20 transfer reverts the mark together with every other write
//! and the claim stays retryable.

use cosmwasm_std::{
    to_json_binary, BankMsg, Binary, Coin, CosmosMsg, DepsMut, MessageInfo, Response, Uint128,
    WasmMsg,
};
use cw20::Cw20ExecuteMsg;

use crate::error::ContractError;
use crate::hash::{bytes32_to_hex, parse_message_id};
use crate::state::{CONFIG, LOCKED_BALANCES, OPERATORS, PROCESSED_MESSAGES, STATS};

pub fn execute_claim(
    deps: DepsMut,
    info: MessageInfo,
    message_id: Binary,
    recipient: String,
    amount: Uint128,
    token: String,
    source_chain_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    let is_operator = OPERATORS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or(false);
    if !is_operator && info.sender != config.owner {
        return Err(ContractError::UnauthorizedOperator);
    }

    let id = parse_message_id(message_id.as_slice())
        .map_err(|length| ContractError::InvalidMessageId { length })?;
    let id_hex = bytes32_to_hex(&id);

    if PROCESSED_MESSAGES.has(deps.storage, &id) {
        return Err(ContractError::AlreadyProcessed { message_id: id_hex });
    }
    PROCESSED_MESSAGES.save(deps.storage, &id, &true)?;

    let recipient_addr = deps.api.addr_validate(&recipient)?;

    let locked = LOCKED_BALANCES
        .may_load(deps.storage, token.as_str())?
        .unwrap_or_default();
    if locked < amount {
        return Err(ContractError::InsufficientLockedBalance {
            token,
            locked,
            needed: amount,
        });
    }
    LOCKED_BALANCES.save(deps.storage, token.as_str(), &(locked - amount))?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_claims += 1;
    STATS.save(deps.storage, &stats)?;

    // CW20 tokens are identified by an instantiated contract at the
    // token identifier, anything else is treated as a native denom
    let is_cw20 = deps.querier.query_wasm_contract_info(&token).is_ok();
    let transfer_msg: CosmosMsg = if is_cw20 {
        WasmMsg::Execute {
            contract_addr: token.clone(),
            msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                recipient: recipient_addr.to_string(),
                amount,
            })?,
            funds: vec![],
        }
        .into()
    } else {
        BankMsg::Send {
            to_address: recipient_addr.to_string(),
            amount: vec![Coin {
                denom: token.clone(),
                amount,
            }],
        }
        .into()
    };

    Ok(Response::new()
        .add_message(transfer_msg)
        .add_attribute("method", "claim")
        .add_attribute("message_id", id_hex)
        .add_attribute("recipient", recipient_addr)
        .add_attribute("token", token)
        .add_attribute("amount", amount.to_string())
        .add_attribute("source_chain_id", source_chain_id.to_string()))
}
