//! Bridge Ledger Contract - lock/claim accounting for cross-chain transfers
//!
//! # Outgoing Flow (Lock)
//! 1. User locks tokens by sending them to this contract (`Bridge` for
//!    native funds, CW20 `Send` for contract tokens)
//! 2. The contract derives a deterministic message identity, records the
//!    transfer, and emits a bridged event
//! 3. Off-chain relays observe the event and drive the claim on the
//!    target chain
//!
//! # Incoming Flow (Claim)
//! 1. A registered operator submits `Claim` with the message identity
//!    observed on the source chain
//! 2. The identity is marked processed before funds move; replays of the
//!    same identity always fail
//! 3. Locked funds are released to the recipient in the same atomic
//!    transaction
//!
//! # Security
//! - Processed-message set for exactly-once claims
//! - Operator gating on claim submission
//! - Per-chain amount bounds and fee configuration
//! - Emergency pause functionality

pub mod contract;
pub mod error;
mod execute;
pub mod fee;
pub mod hash;
pub mod msg;
mod query;
pub mod state;

pub use crate::error::ContractError;
pub use crate::fee::{calculate_fee, fee_and_net};
pub use crate::hash::{compute_message_id, keccak256};
