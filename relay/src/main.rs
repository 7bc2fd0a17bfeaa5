//! Bridge Relay Daemon
//!
//! Watches a source chain for bridged events and submits the matching
//! claims on the target chain:
//! 1. The watcher scans bounded block windows above a persisted
//!    watermark and stores every observed event exactly once
//! 2. The coordinator waits for source-chain confirmations, then signs
//!    and submits claim transactions with bounded retries
//!
//! Transaction ordering, key custody, and gas strategy belong to the
//! signing wallet; this daemon only decides what to claim and when.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use bridge_relay::claimer::EvmClaimer;
use bridge_relay::config::Config;
use bridge_relay::coordinator::{CoordinatorSettings, RelayCoordinator};
use bridge_relay::retry::RetryConfig;
use bridge_relay::rpc::{Connector, EvmConnector};
use bridge_relay::store::{MemoryStore, PgStore, RelayStore};
use bridge_relay::watcher::ChainWatcher;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting Bridge Relay");

    let config = Config::load()?;
    info!(
        source_chain_id = config.source.chain_id,
        target_chain_id = config.target.chain_id,
        confirmations = config.relay.confirmations,
        block_window = config.relay.block_window,
        "Configuration loaded"
    );

    let store: Arc<dyn RelayStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            info!("Database connected, migrations complete");
            Arc::new(store)
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, using in-memory store; watermark will not survive restarts"
            );
            Arc::new(MemoryStore::new())
        }
    };

    // Create shutdown channels
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let (shutdown_tx2, shutdown_rx2) = tokio::sync::mpsc::channel::<()>(1);

    // Setup signal handlers
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
        let _ = shutdown_tx2.send(()).await;
    });

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(256);

    let source_connector: Arc<dyn Connector> = Arc::new(EvmConnector::new(
        config.source.rpc_url.clone(),
        config.source.bridge_address.clone(),
    ));

    let watcher = ChainWatcher::new(
        config.source.chain_id,
        source_connector.clone(),
        store.clone(),
        events_tx,
        config.relay.clone(),
    );

    let mut connectors: HashMap<u64, Arc<dyn Connector>> = HashMap::new();
    connectors.insert(config.source.chain_id, source_connector);

    let claimer = Arc::new(EvmClaimer::new(&config.target)?);
    let coordinator = RelayCoordinator::new(
        store,
        claimer,
        connectors,
        events_rx,
        CoordinatorSettings {
            confirmations: config.relay.confirmations,
            poll_interval: config.relay.poll_interval,
            retry: RetryConfig {
                max_retries: config.relay.max_retries,
                ..Default::default()
            },
        },
    );

    info!("Watcher and coordinator initialized, starting processing");

    // Run both to completion rather than racing them: dropping the
    // sibling future on shutdown would cancel its in-flight RPC calls
    let watcher_task = tokio::spawn(watcher.run(shutdown_rx));
    let coordinator_task = tokio::spawn(coordinator.run(shutdown_rx2));

    let (watcher_result, coordinator_result) = tokio::join!(watcher_task, coordinator_task);
    report_task_result("Watcher", watcher_result);
    report_task_result("Coordinator", coordinator_result);

    info!("Bridge Relay stopped");
    Ok(())
}

fn report_task_result(name: &str, result: Result<eyre::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(task = name, error = %e, "Task exited with error"),
        Err(e) => tracing::error!(task = name, error = %e, "Task panicked"),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bridge_relay=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM)
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
