//! Execute handlers, organized by category:
//! - `bridge` - native and CW20 lock handlers for outgoing transfers
//! - `claim` - release handler for transfers observed on source chains
//! - `admin` - pause, registries, operators, ownership, withdrawals

mod admin;
mod bridge;
mod claim;

pub use admin::*;
pub use bridge::*;
pub use claim::*;
