//! In-memory store for tests and DB-less runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{is_claimable, RelayStore};
use crate::types::{BridgeEventRecord, MessageId, RecordStatus};

#[derive(Default)]
struct Inner {
    watermarks: HashMap<u64, u64>,
    records: HashMap<MessageId, BridgeEventRecord>,
    /// Insertion order, so scans behave like the Postgres created_at sort.
    order: Vec<MessageId>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelayStore for MemoryStore {
    async fn watermark(&self, chain_id: u64) -> Result<Option<u64>> {
        Ok(self.inner.lock().await.watermarks.get(&chain_id).copied())
    }

    async fn set_watermark(&self, chain_id: u64, block: u64) -> Result<()> {
        self.inner.lock().await.watermarks.insert(chain_id, block);
        Ok(())
    }

    async fn insert_record(&self, record: &BridgeEventRecord) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.records.contains_key(&record.message_id) {
            return Ok(false);
        }
        inner.order.push(record.message_id);
        inner.records.insert(record.message_id, record.clone());
        Ok(true)
    }

    async fn get_record(&self, message_id: &MessageId) -> Result<Option<BridgeEventRecord>> {
        Ok(self.inner.lock().await.records.get(message_id).cloned())
    }

    async fn update_record(&self, record: &BridgeEventRecord) -> Result<()> {
        self.inner
            .lock()
            .await
            .records
            .insert(record.message_id, record.clone());
        Ok(())
    }

    async fn claimable_records(&self, now: DateTime<Utc>) -> Result<Vec<BridgeEventRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| is_claimable(record, now))
            .cloned()
            .collect())
    }

    async fn inflight_records(&self) -> Result<Vec<BridgeEventRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| record.status == RecordStatus::ClaimSubmitted)
            .cloned()
            .collect())
    }

    async fn failed_records(&self) -> Result<Vec<BridgeEventRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| record.is_terminal_failure())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BridgeEvent, RecordStatus};

    fn record(seed: u8) -> BridgeEventRecord {
        BridgeEventRecord::from_event(
            56,
            &BridgeEvent {
                message_id: [seed; 32],
                token: "0x1111111111111111111111111111111111111111".to_string(),
                sender: "0x2222222222222222222222222222222222222222".to_string(),
                recipient: "terra1recipient".to_string(),
                net_amount: 99,
                target_chain_id: 7,
                block_number: 100,
            },
        )
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_message_id() {
        let store = MemoryStore::new();
        assert!(store.insert_record(&record(1)).await.unwrap());
        assert!(!store.insert_record(&record(1)).await.unwrap());
        assert!(store.insert_record(&record(2)).await.unwrap());
    }

    #[tokio::test]
    async fn watermark_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.watermark(56).await.unwrap(), None);
        store.set_watermark(56, 200).await.unwrap();
        assert_eq!(store.watermark(56).await.unwrap(), Some(200));
    }

    #[tokio::test]
    async fn completed_and_terminal_records_are_not_claimable() {
        let store = MemoryStore::new();
        let mut completed = record(1);
        completed.status = RecordStatus::Completed;
        let mut terminal = record(2);
        terminal.status = RecordStatus::Failed;
        terminal.next_retry_at = None;
        let mut retryable = record(3);
        retryable.status = RecordStatus::Failed;
        retryable.next_retry_at = Some(Utc::now() - chrono::Duration::seconds(1));

        for r in [&completed, &terminal, &retryable] {
            store.insert_record(r).await.unwrap();
            store.update_record(r).await.unwrap();
        }

        let claimable = store.claimable_records(Utc::now()).await.unwrap();
        assert_eq!(claimable.len(), 1);
        assert_eq!(claimable[0].message_id, [3; 32]);

        let failed = store.failed_records().await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].message_id, [2; 32]);
    }

    #[tokio::test]
    async fn inflight_scan_lists_claim_submitted_only() {
        let store = MemoryStore::new();
        let mut inflight = record(1);
        inflight.status = RecordStatus::ClaimSubmitted;
        store.insert_record(&inflight).await.unwrap();
        store.update_record(&inflight).await.unwrap();
        store.insert_record(&record(2)).await.unwrap();

        let listed = store.inflight_records().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].message_id, [1; 32]);
    }

    #[tokio::test]
    async fn future_retries_are_held_back() {
        let store = MemoryStore::new();
        let mut failed = record(1);
        failed.status = RecordStatus::Failed;
        failed.next_retry_at = Some(Utc::now() + chrono::Duration::seconds(60));
        store.insert_record(&failed).await.unwrap();
        store.update_record(&failed).await.unwrap();

        assert!(store.claimable_records(Utc::now()).await.unwrap().is_empty());
    }
}
