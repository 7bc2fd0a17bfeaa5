//! Source chain watcher.
//!
//! One watcher per source chain. Progress is a single watermark (the
//! last fully processed block); each tick scans at most `block_window`
//! blocks above it and advances the watermark only after every event in
//! the window has been stored and forwarded. An unset watermark starts
//! at the current head, historical blocks are not backfilled.

use eyre::{eyre, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::RelaySettings;
use crate::rpc::{ChainRpc, Connector};
use crate::store::RelayStore;
use crate::types::BridgeEventRecord;

/// Connection state of a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Disconnected,
    Connecting,
    Polling,
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WatcherState::Disconnected => "disconnected",
            WatcherState::Connecting => "connecting",
            WatcherState::Polling => "polling",
        };
        f.write_str(s)
    }
}

pub struct ChainWatcher {
    chain_id: u64,
    connector: Arc<dyn Connector>,
    store: Arc<dyn RelayStore>,
    events_tx: mpsc::Sender<BridgeEventRecord>,
    settings: RelaySettings,
    state: WatcherState,
    rpc: Option<Arc<dyn ChainRpc>>,
}

impl ChainWatcher {
    pub fn new(
        chain_id: u64,
        connector: Arc<dyn Connector>,
        store: Arc<dyn RelayStore>,
        events_tx: mpsc::Sender<BridgeEventRecord>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            chain_id,
            connector,
            store,
            events_tx,
            settings,
            state: WatcherState::Disconnected,
            rpc: None,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    fn set_state(&mut self, next: WatcherState) {
        if self.state != next {
            info!(
                chain_id = self.chain_id,
                from = %self.state,
                to = %next,
                "Watcher state transition"
            );
            self.state = next;
        }
    }

    /// Build a fresh RPC client through the connector.
    pub fn connect(&mut self) -> Result<()> {
        self.set_state(WatcherState::Connecting);
        match self.connector.connect() {
            Ok(rpc) => {
                self.rpc = Some(rpc);
                self.set_state(WatcherState::Polling);
                Ok(())
            }
            Err(e) => {
                self.rpc = None;
                self.set_state(WatcherState::Disconnected);
                Err(e)
            }
        }
    }

    /// Run one poll tick. Returns the number of new records stored.
    ///
    /// Window: `from = watermark + 1`, `to = min(head, from + window - 1)`.
    /// The watermark moves to `to` only after the whole window succeeded,
    /// so a crash or RPC error re-scans the window instead of skipping it.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let rpc = self
            .rpc
            .clone()
            .ok_or_else(|| eyre!("watcher is not connected"))?;

        let head = rpc.head_block().await?;

        let watermark = match self.store.watermark(self.chain_id).await? {
            Some(block) => block,
            None => {
                // First run: start at the head, do not backfill history
                self.store.set_watermark(self.chain_id, head).await?;
                info!(
                    chain_id = self.chain_id,
                    head, "Watermark initialized at current head"
                );
                return Ok(0);
            }
        };

        let from_block = watermark + 1;
        let to_block = head.min(from_block + self.settings.block_window - 1);
        if from_block > to_block {
            debug!(chain_id = self.chain_id, head, watermark, "Nothing to scan");
            return Ok(0);
        }

        let events = rpc.fetch_bridge_events(from_block, to_block).await?;

        let mut stored = 0;
        for event in &events {
            let record = BridgeEventRecord::from_event(self.chain_id, event);
            if self.store.insert_record(&record).await? {
                stored += 1;
                info!(
                    chain_id = self.chain_id,
                    message_id = %record.message_id_hex(),
                    block = event.block_number,
                    net_amount = event.net_amount,
                    target_chain_id = event.target_chain_id,
                    "Observed bridge event"
                );
                if self.events_tx.send(record).await.is_err() {
                    // Coordinator gone; records are persisted and will be
                    // picked up by its store scan if it comes back
                    warn!(chain_id = self.chain_id, "Event channel closed");
                }
            } else {
                debug!(
                    chain_id = self.chain_id,
                    message_id = %record.message_id_hex(),
                    "Duplicate event ignored"
                );
            }
        }

        self.store.set_watermark(self.chain_id, to_block).await?;
        debug!(
            chain_id = self.chain_id,
            from_block, to_block, head, stored, "Window processed"
        );
        Ok(stored)
    }

    /// Main loop: connect, poll on an interval, reconnect after errors,
    /// stop on shutdown signal.
    pub async fn run(mut self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        info!(chain_id = self.chain_id, "Watcher starting");

        loop {
            if self.state != WatcherState::Polling {
                if let Err(e) = self.connect() {
                    error!(
                        chain_id = self.chain_id,
                        error = %e,
                        "Connection failed, retrying after delay"
                    );
                    tokio::select! {
                        _ = shutdown.recv() => break,
                        _ = sleep(self.settings.reconnect_delay) => continue,
                    }
                }
            }

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = sleep(self.settings.poll_interval) => {
                    if let Err(e) = self.poll_once().await {
                        error!(
                            chain_id = self.chain_id,
                            error = %e,
                            "Poll failed, reconnecting"
                        );
                        self.rpc = None;
                        self.set_state(WatcherState::Disconnected);
                        tokio::select! {
                            _ = shutdown.recv() => break,
                            _ = sleep(self.settings.reconnect_delay) => {}
                        }
                    }
                }
            }
        }

        info!(chain_id = self.chain_id, "Watcher shut down");
        Ok(())
    }
}
