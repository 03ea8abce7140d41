//! Execution bridge for tensorbridge
//!
//! This crate runs long load and execute calls off the caller's thread:
//! - `ExecutionBridge`: worker pool with a bounded queue
//! - `Pending` / `Completer`: single-resolution completion slot
//! - `BridgeConfig`: pool settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod config;
pub mod pending;

pub use bridge::{default_bridge, ExecutionBridge};
pub use config::BridgeConfig;
pub use pending::{channel, Completer, Pending, PendingState};
