//! Environment-driven configuration with `.env` support.

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::time::Duration;

/// Main configuration for the relay
#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceChainConfig,
    pub target: TargetChainConfig,
    pub relay: RelaySettings,
    /// Optional Postgres URL. Without it the relay runs on the
    /// in-memory store and the watermark does not survive restarts.
    pub database_url: Option<String>,
}

/// Source chain: where bridged events are observed.
#[derive(Debug, Clone)]
pub struct SourceChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub bridge_address: String,
}

/// Target chain: where claims are submitted.
#[derive(Clone)]
pub struct TargetChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub bridge_address: String,
    pub private_key: String,
}

/// Custom Debug that redacts private_key to prevent accidental log leakage.
impl fmt::Debug for TargetChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("bridge_address", &self.bridge_address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Tuning knobs for the watcher and coordinator loops.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub poll_interval: Duration,
    pub reconnect_delay: Duration,
    /// Source-chain confirmations required before a claim is sent.
    pub confirmations: u64,
    /// Maximum blocks scanned per watcher tick.
    pub block_window: u64,
    pub max_retries: u32,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2_000),
            reconnect_delay: Duration::from_millis(5_000),
            confirmations: 6,
            block_window: 1_000,
            max_retries: 5,
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if
    /// present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        let source = SourceChainConfig {
            rpc_url: require_env("SOURCE_RPC_URL")?,
            chain_id: parse_env("SOURCE_CHAIN_ID")?,
            bridge_address: require_env("SOURCE_BRIDGE_ADDRESS")?,
        };
        let target = TargetChainConfig {
            rpc_url: require_env("TARGET_RPC_URL")?,
            chain_id: parse_env("TARGET_CHAIN_ID")?,
            bridge_address: require_env("TARGET_BRIDGE_ADDRESS")?,
            private_key: require_env("RELAY_PRIVATE_KEY")?,
        };

        let defaults = RelaySettings::default();
        let relay = RelaySettings {
            poll_interval: Duration::from_millis(parse_env_or(
                "POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            reconnect_delay: Duration::from_millis(parse_env_or(
                "RECONNECT_DELAY_MS",
                defaults.reconnect_delay.as_millis() as u64,
            )?),
            confirmations: parse_env_or("CONFIRMATIONS", defaults.confirmations)?,
            block_window: parse_env_or("BLOCK_WINDOW", defaults.block_window)?,
            max_retries: parse_env_or("RETRY_ATTEMPTS", defaults.max_retries)?,
        };

        let config = Self {
            source,
            target,
            relay,
            database_url: env::var("DATABASE_URL").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_evm_address(&self.source.bridge_address)
            .wrap_err("SOURCE_BRIDGE_ADDRESS invalid")?;
        validate_evm_address(&self.target.bridge_address)
            .wrap_err("TARGET_BRIDGE_ADDRESS invalid")?;
        validate_private_key(&self.target.private_key).wrap_err("RELAY_PRIVATE_KEY invalid")?;

        if self.relay.block_window == 0 {
            return Err(eyre!("BLOCK_WINDOW must be greater than zero"));
        }
        if self.relay.poll_interval.is_zero() {
            return Err(eyre!("POLL_INTERVAL_MS must be greater than zero"));
        }
        if self.source.chain_id == self.target.chain_id {
            return Err(eyre!("source and target chain ids must differ"));
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| eyre!("{} is not set", key))
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    require_env(key)?
        .parse()
        .wrap_err_with(|| format!("{} is not a valid value", key))
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .wrap_err_with(|| format!("{} is not a valid value", key)),
        Err(_) => Ok(default),
    }
}

fn validate_evm_address(address: &str) -> Result<()> {
    let stripped = address
        .strip_prefix("0x")
        .ok_or_else(|| eyre!("address must start with 0x"))?;
    if stripped.len() != 40 || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(eyre!("address must be 0x followed by 40 hex characters"));
    }
    Ok(())
}

fn validate_private_key(key: &str) -> Result<()> {
    let stripped = key.strip_prefix("0x").unwrap_or(key);
    if stripped.len() != 64 || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(eyre!("private key must be 64 hex characters"));
    }
    Ok(())
}
