//! Module builder

use std::sync::Arc;

use tensorbridge_concurrency::{default_bridge, BridgeConfig, ExecutionBridge};
use tensorbridge_core::{Error, Result};
use tensorbridge_engine::{Engine, ModelSource, Verification};

use super::Module;
use crate::executor::{Executor, ModuleOptions};

/// Configures a [`Module`].
///
/// # Example
///
/// ```ignore
/// let module = Module::builder(ModelSource::buffer(bytes))
///     .engine(engine)
///     .verification(Verification::InternalConsistency)
///     .bridge_config(BridgeConfig::new().num_workers(2))
///     .build()?;
/// ```
pub struct ModuleBuilder {
    source: ModelSource,
    engine: Option<Box<dyn Engine>>,
    bridge: Option<Arc<ExecutionBridge>>,
    bridge_config: Option<BridgeConfig>,
    options: ModuleOptions,
}

impl ModuleBuilder {
    /// Builder for a handle on `source`.
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            engine: None,
            bridge: None,
            bridge_config: None,
            options: ModuleOptions::default(),
        }
    }

    /// Engine instance that backs the handle (required).
    pub fn engine(mut self, engine: Box<dyn Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Share an existing bridge.
    pub fn bridge(mut self, bridge: Arc<ExecutionBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Start a dedicated bridge with these settings.
    pub fn bridge_config(mut self, config: BridgeConfig) -> Self {
        self.bridge_config = Some(config);
        self
    }

    /// Default verification mode for `load`.
    pub fn verification(mut self, verification: Verification) -> Self {
        self.options.verification = verification;
        self
    }

    /// Enable or disable tensor dtype / rank checks.
    pub fn check_tensor_meta(mut self, enabled: bool) -> Self {
        self.options.check_tensor_meta = enabled;
        self
    }

    /// Apply a full set of options.
    pub fn options(mut self, options: ModuleOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the handle.
    ///
    /// Without an explicit bridge or bridge config the process-wide bridge
    /// is used.
    pub fn build(self) -> Result<Module> {
        let engine = self
            .engine
            .ok_or_else(|| Error::InvalidArgument("module builder needs an engine".to_string()))?;

        let bridge = match (self.bridge, self.bridge_config) {
            (Some(bridge), _) => bridge,
            (None, Some(config)) => Arc::new(ExecutionBridge::with_config(config)?),
            (None, None) => default_bridge()?,
        };

        Ok(Module::from_executor(Executor::new(
            self.source,
            engine,
            bridge,
            self.options,
        )))
    }
}
