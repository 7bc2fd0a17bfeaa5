//! Claim coordinator.
//!
//! Consumes watcher events and periodically rescans the store, so
//! records left over from a previous run are driven to completion
//! without being re-observed. Deduplication is by message identity
//! against the local store; the contract's processed-message set is the
//! final guard against racing relays.

use chrono::Utc;
use eyre::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::claimer::{ClaimOutcome, ClaimSubmitter};
use crate::retry::{classify_error, ErrorClass, RetryConfig};
use crate::rpc::{ChainRpc, Connector};
use crate::store::RelayStore;
use crate::types::{BridgeEventRecord, MessageId, RecordStatus};

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Source-chain confirmations required before a claim is sent.
    pub confirmations: u64,
    /// Store rescan interval.
    pub poll_interval: Duration,
    pub retry: RetryConfig,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            confirmations: 6,
            poll_interval: Duration::from_secs(2),
            retry: RetryConfig::default(),
        }
    }
}

pub struct RelayCoordinator {
    store: Arc<dyn RelayStore>,
    submitter: Arc<dyn ClaimSubmitter>,
    /// Source chain connectors, used to read head blocks for
    /// confirmation counting. Rebuilt on RPC errors.
    connectors: HashMap<u64, Arc<dyn Connector>>,
    rpcs: HashMap<u64, Arc<dyn ChainRpc>>,
    events_rx: mpsc::Receiver<BridgeEventRecord>,
    settings: CoordinatorSettings,
}

impl RelayCoordinator {
    pub fn new(
        store: Arc<dyn RelayStore>,
        submitter: Arc<dyn ClaimSubmitter>,
        connectors: HashMap<u64, Arc<dyn Connector>>,
        events_rx: mpsc::Receiver<BridgeEventRecord>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            store,
            submitter,
            connectors,
            rpcs: HashMap::new(),
            events_rx,
            settings,
        }
    }

    async fn source_head(&mut self, chain_id: u64) -> Result<u64> {
        if !self.rpcs.contains_key(&chain_id) {
            let connector = self
                .connectors
                .get(&chain_id)
                .ok_or_else(|| eyre::eyre!("no connector for chain {}", chain_id))?;
            self.rpcs.insert(chain_id, connector.connect()?);
        }
        // entry known to exist after the insert above
        let rpc = self.rpcs.get(&chain_id).cloned();
        match rpc {
            Some(rpc) => match rpc.head_block().await {
                Ok(head) => Ok(head),
                Err(e) => {
                    self.rpcs.remove(&chain_id);
                    Err(e)
                }
            },
            None => Err(eyre::eyre!("no connector for chain {}", chain_id)),
        }
    }

    /// Drive a single record one step forward.
    pub async fn process_record(&mut self, message_id: &MessageId) -> Result<()> {
        // Always act on the stored state; the channel copy may be stale
        let Some(mut record) = self.store.get_record(message_id).await? else {
            return Ok(());
        };

        match record.status {
            RecordStatus::Completed | RecordStatus::ClaimSubmitted => {
                debug!(
                    message_id = %record.message_id_hex(),
                    status = %record.status,
                    "Skipping already handled record"
                );
                return Ok(());
            }
            RecordStatus::Failed => {
                if record.is_terminal_failure() {
                    return Ok(());
                }
                let due = record
                    .next_retry_at
                    .map(|at| at <= Utc::now())
                    .unwrap_or(true);
                if !due {
                    return Ok(());
                }
            }
            RecordStatus::Observed | RecordStatus::ReadyToClaim => {}
        }

        // Confirmation gate against the source chain head
        let head = match self.source_head(record.source_chain_id).await {
            Ok(head) => head,
            Err(e) => {
                warn!(
                    chain_id = record.source_chain_id,
                    error = %e,
                    "Cannot read source head, deferring record"
                );
                return Ok(());
            }
        };
        record.confirmation_count = head.saturating_sub(record.source_block);
        if record.confirmation_count < self.settings.confirmations {
            debug!(
                message_id = %record.message_id_hex(),
                confirmations = record.confirmation_count,
                required = self.settings.confirmations,
                "Waiting for confirmations"
            );
            self.store.update_record(&record).await?;
            return Ok(());
        }

        // Persist the in-flight status before submitting so a crash
        // between send and receipt does not double-claim on restart
        record.status = RecordStatus::ClaimSubmitted;
        self.store.update_record(&record).await?;
        info!(
            message_id = %record.message_id_hex(),
            target_chain_id = record.target_chain_id,
            net_amount = record.net_amount,
            attempt = record.attempts,
            "Submitting claim"
        );

        match self.submitter.submit_claim(&record).await {
            Ok(ClaimOutcome::Confirmed { tx_hash }) => {
                record.status = RecordStatus::Completed;
                record.last_error = None;
                record.next_retry_at = None;
                info!(
                    message_id = %record.message_id_hex(),
                    tx_hash = %tx_hash,
                    "Claim completed"
                );
            }
            Ok(ClaimOutcome::AlreadyProcessed) => {
                record.status = RecordStatus::Completed;
                record.last_error = None;
                record.next_retry_at = None;
                info!(
                    message_id = %record.message_id_hex(),
                    "Identity already claimed on chain, marking completed"
                );
            }
            Err(e) => {
                let message = e.to_string();
                if classify_error(&message) == ErrorClass::AlreadyProcessed {
                    record.status = RecordStatus::Completed;
                    record.last_error = None;
                    record.next_retry_at = None;
                    info!(
                        message_id = %record.message_id_hex(),
                        "Claim reverted as already processed, marking completed"
                    );
                } else {
                    record.attempts += 1;
                    record.last_error = Some(message.clone());
                    record.status = RecordStatus::Failed;
                    if self.settings.retry.should_retry(record.attempts) {
                        record.next_retry_at =
                            Some(self.settings.retry.next_retry_after(record.attempts - 1));
                        warn!(
                            message_id = %record.message_id_hex(),
                            attempt = record.attempts,
                            max_retries = self.settings.retry.max_retries,
                            error = %message,
                            "Claim failed, retry scheduled"
                        );
                    } else {
                        record.next_retry_at = None;
                        error!(
                            message_id = %record.message_id_hex(),
                            attempts = record.attempts,
                            error = %message,
                            "Claim retries exhausted, record held for manual reprocessing"
                        );
                    }
                }
            }
        }

        self.store.update_record(&record).await?;
        Ok(())
    }

    /// Reconcile records a previous run left in `ClaimSubmitted`.
    ///
    /// A crash between send and receipt strands the stored status with
    /// no task driving it. The chain knows the truth: identities found
    /// in the processed set complete, everything else is re-queued and
    /// the on-chain replay guard absorbs any double submission.
    pub async fn recover_inflight(&mut self) -> Result<()> {
        let records = self.store.inflight_records().await?;
        for mut record in records {
            match self.submitter.is_processed(&record.message_id).await {
                Ok(true) => {
                    record.status = RecordStatus::Completed;
                    record.last_error = None;
                    record.next_retry_at = None;
                    info!(
                        message_id = %record.message_id_hex(),
                        "Interrupted claim found processed on chain, marking completed"
                    );
                }
                Ok(false) => {
                    record.status = RecordStatus::Observed;
                    info!(
                        message_id = %record.message_id_hex(),
                        "Interrupted claim not on chain, re-queued"
                    );
                }
                Err(e) => {
                    warn!(
                        message_id = %record.message_id_hex(),
                        error = %e,
                        "Cannot reconcile interrupted claim, retrying next rescan"
                    );
                    continue;
                }
            }
            self.store.update_record(&record).await?;
        }
        Ok(())
    }

    /// Rescan the store for records that still need attention.
    pub async fn drain_store(&mut self) -> Result<()> {
        self.recover_inflight().await?;
        let records = self.store.claimable_records(Utc::now()).await?;
        for record in records {
            if let Err(e) = self.process_record(&record.message_id).await {
                error!(
                    message_id = %record.message_id_hex(),
                    error = %e,
                    "Failed to process record"
                );
            }
        }
        Ok(())
    }

    /// Main loop: react to fresh events, rescan on an interval, stop on
    /// shutdown signal.
    pub async fn run(mut self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        info!(
            confirmations = self.settings.confirmations,
            "Coordinator starting"
        );

        // pick up whatever the previous run left behind before waiting
        // for fresh events
        if let Err(e) = self.drain_store().await {
            error!(error = %e, "Startup store scan failed");
        }

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                event = self.events_rx.recv() => {
                    if let Some(record) = event {
                        if let Err(e) = self.process_record(&record.message_id).await {
                            error!(
                                message_id = %record.message_id_hex(),
                                error = %e,
                                "Failed to process record"
                            );
                        }
                    }
                }
                _ = sleep(self.settings.poll_interval) => {
                    if let Err(e) = self.drain_store().await {
                        error!(error = %e, "Store rescan failed");
                    }
                }
            }
        }

        info!("Coordinator shut down");
        Ok(())
    }
}
