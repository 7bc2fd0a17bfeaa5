//! Persistence behind an interface.
//!
//! Watermarks and bridge event records survive restarts through a
//! `RelayStore` implementation: Postgres in production, in-memory for
//! tests and DB-less runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;

use crate::types::{BridgeEventRecord, MessageId};

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait]
pub trait RelayStore: Send + Sync {
    /// Last fully processed block for a source chain, if any.
    async fn watermark(&self, chain_id: u64) -> Result<Option<u64>>;

    async fn set_watermark(&self, chain_id: u64, block: u64) -> Result<()>;

    /// Insert a new record. Returns false when a record with the same
    /// message identity already exists (the insert is a no-op then).
    async fn insert_record(&self, record: &BridgeEventRecord) -> Result<bool>;

    async fn get_record(&self, message_id: &MessageId) -> Result<Option<BridgeEventRecord>>;

    /// Overwrite an existing record's mutable fields (status, attempts,
    /// confirmation count, retry schedule, last error).
    async fn update_record(&self, record: &BridgeEventRecord) -> Result<()>;

    /// Records the coordinator should look at: observed and ready
    /// records, plus failed ones whose scheduled retry time has passed.
    /// Completed records and terminal failures are never returned.
    async fn claimable_records(&self, now: DateTime<Utc>) -> Result<Vec<BridgeEventRecord>>;

    /// Records left in `ClaimSubmitted`, e.g. by a crash between
    /// submission and receipt. The coordinator reconciles these against
    /// the target chain before resuming normal claim scans.
    async fn inflight_records(&self) -> Result<Vec<BridgeEventRecord>>;

    /// Terminal failures retained for manual reprocessing.
    async fn failed_records(&self) -> Result<Vec<BridgeEventRecord>>;
}

/// Shared claimability rule so both stores filter identically.
pub(crate) fn is_claimable(record: &BridgeEventRecord, now: DateTime<Utc>) -> bool {
    use crate::types::RecordStatus;
    match record.status {
        RecordStatus::Observed | RecordStatus::ReadyToClaim => true,
        RecordStatus::Failed => match record.next_retry_at {
            Some(retry_at) => retry_at <= now,
            None => false,
        },
        RecordStatus::ClaimSubmitted | RecordStatus::Completed => false,
    }
}
