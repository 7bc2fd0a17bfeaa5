//! Bridge Relay - Library interface
//!
//! Re-exports internal modules for use in integration tests.

pub mod claimer;
pub mod config;
pub mod coordinator;
pub mod fee;
pub mod hash;
pub mod retry;
pub mod rpc;
pub mod store;
pub mod types;
pub mod watcher;
