//! Shared types for the relay pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 32-byte keccak-256 message identity, as emitted by the bridge contract.
pub type MessageId = [u8; 32];

/// Lifecycle of an observed bridge event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Stored, waiting for confirmations on the source chain.
    Observed,
    /// Confirmation threshold reached, claim not yet sent.
    ReadyToClaim,
    /// Claim transaction sent, result pending.
    ClaimSubmitted,
    /// Claim confirmed (or found already processed on chain).
    Completed,
    /// Claim failed. Retryable while `next_retry_at` is set; terminal
    /// once retries are exhausted and `next_retry_at` is cleared.
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Observed => "observed",
            RecordStatus::ReadyToClaim => "ready_to_claim",
            RecordStatus::ClaimSubmitted => "claim_submitted",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "observed" => Some(RecordStatus::Observed),
            "ready_to_claim" => Some(RecordStatus::ReadyToClaim),
            "claim_submitted" => Some(RecordStatus::ClaimSubmitted),
            "completed" => Some(RecordStatus::Completed),
            "failed" => Some(RecordStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bridged event decoded from a source chain log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeEvent {
    pub message_id: MessageId,
    pub token: String,
    pub sender: String,
    pub recipient: String,
    pub net_amount: u128,
    pub target_chain_id: u64,
    pub block_number: u64,
}

/// Persistent record of a bridge event and its claim progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeEventRecord {
    pub message_id: MessageId,
    pub source_chain_id: u64,
    pub source_block: u64,
    pub token: String,
    pub sender: String,
    pub recipient: String,
    pub net_amount: u128,
    pub target_chain_id: u64,
    /// Confirmations observed at the last coordinator pass.
    pub confirmation_count: u64,
    pub status: RecordStatus,
    pub attempts: u32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl BridgeEventRecord {
    pub fn from_event(source_chain_id: u64, event: &BridgeEvent) -> Self {
        Self {
            message_id: event.message_id,
            source_chain_id,
            source_block: event.block_number,
            token: event.token.clone(),
            sender: event.sender.clone(),
            recipient: event.recipient.clone(),
            net_amount: event.net_amount,
            target_chain_id: event.target_chain_id,
            confirmation_count: 0,
            status: RecordStatus::Observed,
            attempts: 0,
            next_retry_at: None,
            last_error: None,
        }
    }

    /// Terminal failures keep `Failed` status with no scheduled retry.
    pub fn is_terminal_failure(&self) -> bool {
        self.status == RecordStatus::Failed && self.next_retry_at.is_none()
    }

    pub fn message_id_hex(&self) -> String {
        crate::hash::bytes32_to_hex(&self.message_id)
    }
}
