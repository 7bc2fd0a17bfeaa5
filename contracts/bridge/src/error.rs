use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unauthorized: operator required")]
    UnauthorizedOperator,

    #[error("Bridge is paused")]
    BridgePaused,

    #[error("Chain not supported: {chain_id}")]
    ChainNotSupported { chain_id: u64 },

    #[error("Chain disabled: {chain_id}")]
    ChainDisabled { chain_id: u64 },

    #[error("Token not supported on chain {chain_id}: {token}")]
    TokenNotSupported { chain_id: u64, token: String },

    #[error("Invalid chain config: {reason}")]
    InvalidChainConfig { reason: String },

    #[error("Amount {amount} below minimum {min_amount}")]
    BelowMinimumAmount {
        amount: Uint128,
        min_amount: Uint128,
    },

    #[error("Amount {amount} above maximum {max_amount}")]
    AboveMaximumAmount {
        amount: Uint128,
        max_amount: Uint128,
    },

    #[error("Fee {fee} exceeds amount {amount}")]
    FeeExceedsAmount { amount: Uint128, fee: Uint128 },

    #[error("Message already processed: {message_id}")]
    AlreadyProcessed { message_id: String },

    #[error("Invalid message id: expected 32 bytes, got {length}")]
    InvalidMessageId { length: usize },

    #[error("Insufficient locked balance for {token}: have {locked}, need {needed}")]
    InsufficientLockedBalance {
        token: String,
        locked: Uint128,
        needed: Uint128,
    },

    #[error("No funds sent")]
    NoFunds,

    #[error("Expected exactly one native coin")]
    MultipleDenoms,

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Operator already registered: {operator}")]
    OperatorExists { operator: String },

    #[error("Operator not registered: {operator}")]
    OperatorNotFound { operator: String },
}
