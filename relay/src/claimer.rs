//! Claim submission behind the `ClaimSubmitter` seam.
//!
//! The production implementation signs and sends an EVM claim
//! transaction and waits for its receipt. Gas strategy is left to the
//! node defaults; the retry policy lives in the coordinator.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, FixedBytes, U256};
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::TargetChainConfig;
use crate::types::{BridgeEventRecord, MessageId};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract BridgeLedger {
        function claim(
            bytes32 messageId,
            address recipient,
            uint256 amount,
            address token,
            uint256 sourceChainId
        ) external;

        function processedMessages(bytes32 messageId) external view returns (bool);
    }
}

/// Result of a claim submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Claim transaction mined successfully.
    Confirmed { tx_hash: String },
    /// The identity was already consumed on chain. Not an error, some
    /// other relay (or an earlier attempt) won the race.
    AlreadyProcessed,
}

#[async_trait]
pub trait ClaimSubmitter: Send + Sync {
    async fn submit_claim(&self, record: &BridgeEventRecord) -> Result<ClaimOutcome>;

    /// Whether the identity is already consumed on the target chain.
    /// Used to reconcile claims interrupted between send and receipt.
    async fn is_processed(&self, message_id: &MessageId) -> Result<bool>;
}

/// Submits claims to an EVM bridge ledger contract.
pub struct EvmClaimer {
    rpc_url: String,
    bridge_address: Address,
    signer: PrivateKeySigner,
}

impl EvmClaimer {
    pub fn new(config: &TargetChainConfig) -> Result<Self> {
        let signer: PrivateKeySigner = config
            .private_key
            .parse()
            .wrap_err("Invalid relay private key")?;
        let bridge_address =
            Address::from_str(&config.bridge_address).wrap_err("Invalid bridge address")?;

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            bridge_address,
            signer,
        })
    }
}

#[async_trait]
impl ClaimSubmitter for EvmClaimer {
    async fn submit_claim(&self, record: &BridgeEventRecord) -> Result<ClaimOutcome> {
        // On-chain precheck saves the gas of a guaranteed revert when
        // another relay already claimed this identity
        if self.is_processed(&record.message_id).await? {
            debug!(
                message_id = %record.message_id_hex(),
                "Identity already processed on chain"
            );
            return Ok(ClaimOutcome::AlreadyProcessed);
        }

        let wallet = EthereumWallet::from(self.signer.clone());
        // recommended fillers supply nonce, gas, and chain id; without
        // them the wallet filler rejects every send
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().wrap_err("Invalid RPC URL")?);
        let contract = BridgeLedger::new(self.bridge_address, &provider);

        let message_id = FixedBytes::from(record.message_id);

        let recipient =
            Address::from_str(&record.recipient).wrap_err("Invalid recipient address")?;
        let token = Address::from_str(&record.token).wrap_err("Invalid token address")?;

        let pending_tx = contract
            .claim(
                message_id,
                recipient,
                U256::from(record.net_amount),
                token,
                U256::from(record.source_chain_id),
            )
            .send()
            .await
            .wrap_err("Failed to send claim transaction")?;

        let tx_hash = *pending_tx.tx_hash();
        info!(
            tx_hash = %tx_hash,
            message_id = %record.message_id_hex(),
            "Claim transaction sent, waiting for confirmation"
        );

        let receipt = pending_tx
            .get_receipt()
            .await
            .wrap_err("Failed to get claim receipt")?;

        if !receipt.status() {
            return Err(eyre!("claim transaction reverted: 0x{:x}", tx_hash));
        }

        Ok(ClaimOutcome::Confirmed {
            tx_hash: format!("0x{:x}", tx_hash),
        })
    }

    async fn is_processed(&self, message_id: &MessageId) -> Result<bool> {
        // read-only call, no wallet needed
        let provider =
            ProviderBuilder::new().on_http(self.rpc_url.parse().wrap_err("Invalid RPC URL")?);
        let contract = BridgeLedger::new(self.bridge_address, &provider);
        let processed = contract
            .processedMessages(FixedBytes::from(*message_id))
            .call()
            .await?;
        Ok(processed._0)
    }
}
