//! Source chain access behind the `ChainRpc` seam.
//!
//! Logs are decoded into typed `BridgeEvent`s at this boundary; nothing
//! downstream touches raw RPC payloads. Malformed logs are logged and
//! skipped rather than propagated.

use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{Filter, Log};
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::types::BridgeEvent;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("log is missing {0}")]
    MissingField(&'static str),
    #[error("unexpected topic count: {0}")]
    TopicCount(usize),
    #[error("data length {got}, expected {expected}")]
    DataLength { got: usize, expected: usize },
    #[error("{field} does not fit the target integer")]
    IntegerOverflow { field: &'static str },
}

#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Current head block number.
    async fn head_block(&self) -> Result<u64>;

    /// Bridged events emitted by the bridge contract in the inclusive
    /// block range.
    async fn fetch_bridge_events(&self, from_block: u64, to_block: u64)
        -> Result<Vec<BridgeEvent>>;
}

/// Builds a fresh `ChainRpc` client. The watcher reconnects through
/// this after every RPC failure.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn ChainRpc>>;
}

/// HTTP JSON-RPC client for an EVM source chain.
pub struct EvmRpc {
    provider: RootProvider<Http<Client>>,
    bridge_address: Address,
}

impl EvmRpc {
    pub fn new(rpc_url: &str, bridge_address: &str) -> Result<Self> {
        let url = rpc_url.parse().wrap_err("Failed to parse RPC URL")?;
        let provider = ProviderBuilder::new().on_http(url);
        let bridge_address =
            Address::from_str(bridge_address).wrap_err("Invalid bridge address")?;

        Ok(Self {
            provider,
            bridge_address,
        })
    }

    /// Event signature topic, computed at runtime.
    fn bridged_signature() -> B256 {
        // keccak256("Bridged(bytes32,address,address,bytes32,uint256,uint256)")
        alloy::primitives::keccak256(
            b"Bridged(bytes32,address,address,bytes32,uint256,uint256)",
        )
    }

    /// Decode a Bridged log.
    ///
    /// Indexed: messageId, token, sender. Data words: recipient
    /// (bytes32), netAmount (uint256), targetChainId (uint256).
    fn parse_bridged_log(log: &Log) -> Result<BridgeEvent, DecodeError> {
        let topics = log.topics();
        if topics.len() != 4 {
            return Err(DecodeError::TopicCount(topics.len()));
        }

        let block_number = log
            .block_number
            .ok_or(DecodeError::MissingField("block_number"))?;

        let message_id: [u8; 32] = topics[1].0;
        let token = Address::from_slice(&topics[2].0[12..]);
        let sender = Address::from_slice(&topics[3].0[12..]);

        let data = log.data().data.as_ref();
        if data.len() != 96 {
            return Err(DecodeError::DataLength {
                got: data.len(),
                expected: 96,
            });
        }

        let recipient = Address::from_slice(&data[12..32]);
        let net_amount: u128 = U256::from_be_slice(&data[32..64])
            .try_into()
            .map_err(|_| DecodeError::IntegerOverflow { field: "netAmount" })?;
        let target_chain_id: u64 = U256::from_be_slice(&data[64..96])
            .try_into()
            .map_err(|_| DecodeError::IntegerOverflow {
                field: "targetChainId",
            })?;

        Ok(BridgeEvent {
            message_id,
            token: format!("{:?}", token),
            sender: format!("{:?}", sender),
            recipient: format!("{:?}", recipient),
            net_amount,
            target_chain_id,
            block_number,
        })
    }
}

#[async_trait]
impl ChainRpc for EvmRpc {
    async fn head_block(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .wrap_err("Failed to get block number")
    }

    async fn fetch_bridge_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<BridgeEvent>> {
        let filter = Filter::new()
            .address(self.bridge_address)
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .wrap_err("Failed to fetch logs")?;

        let signature = Self::bridged_signature();
        let mut events = Vec::new();
        for log in &logs {
            let topics = log.topics();
            if topics.first() != Some(&signature) {
                continue;
            }
            match Self::parse_bridged_log(log) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(
                        error = %e,
                        tx_hash = ?log.transaction_hash,
                        "Skipping malformed Bridged log"
                    );
                }
            }
        }
        Ok(events)
    }
}

/// Connector for EVM chains; owns the connection parameters.
pub struct EvmConnector {
    rpc_url: String,
    bridge_address: String,
}

impl EvmConnector {
    pub fn new(rpc_url: String, bridge_address: String) -> Self {
        Self {
            rpc_url,
            bridge_address,
        }
    }
}

impl Connector for EvmConnector {
    fn connect(&self) -> Result<Arc<dyn ChainRpc>> {
        Ok(Arc::new(EvmRpc::new(&self.rpc_url, &self.bridge_address)?))
    }
}
