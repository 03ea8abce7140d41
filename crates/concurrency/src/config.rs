//! Execution bridge configuration

use serde::{Deserialize, Serialize};
use tensorbridge_core::{Error, Result};

/// Default bound on queued, not yet started units
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 1024;

/// Default worker thread name prefix
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "tensorbridge-worker";

/// Worker pool settings for an [`ExecutionBridge`](crate::ExecutionBridge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Number of worker threads (at least 1)
    pub num_workers: usize,
    /// Maximum queued units; 0 means unbounded
    pub max_queue_depth: usize,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
    /// Worker stack size in bytes, platform default when unset
    pub stack_size: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get().max(1),
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

impl BridgeConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Set the queue bound (0 for unbounded).
    pub fn max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth;
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker stack size.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Check the settings before spawning workers.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::InvalidArgument(
                "bridge needs at least one worker".to_string(),
            ));
        }
        Ok(())
    }
}
