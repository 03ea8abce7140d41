//! Command executor
//!
//! The [`Executor`] owns one engine instance and dispatches [`Command`]s to
//! the handlers, either inline ([`Executor::execute`]) or on the execution
//! bridge ([`Executor::submit`]). Both paths run the same dispatch function
//! over the same state, so they produce identical results.
//!
//! ## Locking
//!
//! The engine lives behind a read-write lock. `Execute` and the read-only
//! commands share it, so loaded methods can run concurrently. `Load` and
//! `LoadMethod` take it exclusively and never interleave with executions
//! on the same handle.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tensorbridge_concurrency::{ExecutionBridge, Pending};
use tensorbridge_core::Result;
use tensorbridge_engine::{Engine, ModelSource, Verification};
use tracing::debug;

use crate::command::{Command, Output};
use crate::handlers;

/// Per-handle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOptions {
    /// Verification mode used by `Load` without an override
    pub verification: Verification,
    /// Check tensor dtype and rank against the signature before calls
    pub check_tensor_meta: bool,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            verification: Verification::Minimal,
            check_tensor_meta: true,
        }
    }
}

/// Engine plus what this layer tracks about it.
pub(crate) struct ModelState {
    pub(crate) engine: Box<dyn Engine>,
    pub(crate) loaded: bool,
    pub(crate) loaded_methods: HashSet<String>,
}

/// State shared by the inline and background paths.
pub(crate) struct Shared {
    pub(crate) source: ModelSource,
    pub(crate) state: RwLock<ModelState>,
    pub(crate) options: ModuleOptions,
}

/// Dispatches commands against one model.
#[derive(Clone)]
pub struct Executor {
    shared: Arc<Shared>,
    bridge: Arc<ExecutionBridge>,
}

impl Executor {
    /// Executor for `source` on `engine`, submitting background work to `bridge`.
    pub fn new(
        source: ModelSource,
        engine: Box<dyn Engine>,
        bridge: Arc<ExecutionBridge>,
        options: ModuleOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                state: RwLock::new(ModelState {
                    engine,
                    loaded: false,
                    loaded_methods: HashSet::new(),
                }),
                options,
            }),
            bridge,
        }
    }

    /// Run a command on the caller's thread.
    pub fn execute(&self, command: Command) -> Result<Output> {
        dispatch(&self.shared, command)
    }

    /// Run a command on the execution bridge.
    pub fn submit(&self, command: Command) -> Pending<Output> {
        self.submit_map(command, Ok)
    }

    /// Run a command on the execution bridge and map its output on the
    /// worker.
    pub fn submit_map<T, F>(&self, command: Command, map: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(Output) -> Result<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.bridge
            .submit(move || dispatch(&shared, command).and_then(map))
    }

    /// Where the model's program comes from
    pub fn source(&self) -> &ModelSource {
        &self.shared.source
    }

    /// Handle settings
    pub fn options(&self) -> &ModuleOptions {
        &self.shared.options
    }

    /// The bridge background work is submitted to
    pub fn bridge(&self) -> &Arc<ExecutionBridge> {
        &self.bridge
    }
}

fn dispatch(shared: &Shared, command: Command) -> Result<Output> {
    debug!(command = command.name(), "Dispatching command");
    match command {
        Command::Load { verification } => handlers::program::load(shared, verification),
        Command::IsLoaded => handlers::program::is_loaded(shared),
        Command::MethodNames => handlers::program::method_names(shared),
        Command::LoadMethod { name } => handlers::method::load_method(shared, &name),
        Command::IsMethodLoaded { name } => handlers::method::is_method_loaded(shared, &name),
        Command::MethodMeta { name } => handlers::method::method_meta(shared, &name),
        Command::Execute { method, args } => handlers::method::execute(shared, &method, &args),
    }
}
