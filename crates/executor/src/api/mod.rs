//! Typed model handle
//!
//! [`Module`] wraps the [`Executor`] and its [`Command`]/[`Output`] enums
//! with typed methods. Each method:
//!
//! 1. Creates the appropriate [`Command`]
//! 2. Runs it inline, or on the execution bridge for the `_async` variants
//! 3. Extracts the typed result
//!
//! # Example
//!
//! ```ignore
//! use tensorbridge_executor::Module;
//!
//! let module = Module::builder(ModelSource::file("model.pte"))
//!     .engine(engine)
//!     .build()?;
//!
//! module.load()?;
//! let outputs = module.forward(vec![input.into()])?;
//! ```

mod builder;

pub use builder::ModuleBuilder;

use tensorbridge_concurrency::Pending;
use tensorbridge_core::{Error, HostValue, MethodMeta, Result};
use tensorbridge_engine::{Engine, ModelSource, Verification};

use crate::{Command, Executor, Output};

/// Name of the conventional entry point
pub const FORWARD: &str = "forward";

/// A handle to one model program.
#[derive(Clone)]
pub struct Module {
    executor: Executor,
}

impl Module {
    /// Handle for `source` on `engine`, using the process-wide bridge.
    pub fn new(source: ModelSource, engine: Box<dyn Engine>) -> Result<Self> {
        ModuleBuilder::new(source).engine(engine).build()
    }

    /// Start configuring a handle.
    pub fn builder(source: ModelSource) -> ModuleBuilder {
        ModuleBuilder::new(source)
    }

    pub(crate) fn from_executor(executor: Executor) -> Self {
        Self { executor }
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    // =========================================================================
    // Program
    // =========================================================================

    /// Load the program with the handle's default verification.
    pub fn load(&self) -> Result<()> {
        expect_unit(self.executor.execute(Command::Load { verification: None })?, "Load")
    }

    /// Load the program with an explicit verification mode.
    pub fn load_with(&self, verification: Verification) -> Result<()> {
        expect_unit(
            self.executor.execute(Command::Load {
                verification: Some(verification),
            })?,
            "Load",
        )
    }

    /// Load the program on the execution bridge.
    pub fn load_async(&self) -> Pending<()> {
        self.executor
            .submit_map(Command::Load { verification: None }, |out| expect_unit(out, "Load"))
    }

    /// Check whether the program is loaded.
    pub fn is_loaded(&self) -> Result<bool> {
        expect_bool(self.executor.execute(Command::IsLoaded)?, "IsLoaded")
    }

    /// Names of the program's methods.
    pub fn method_names(&self) -> Result<Vec<String>> {
        match self.executor.execute(Command::MethodNames)? {
            Output::Names(names) => Ok(names),
            other => Err(unexpected(&other, "MethodNames")),
        }
    }

    // =========================================================================
    // Methods
    // =========================================================================

    /// Prepare a method for execution.
    pub fn load_method(&self, name: &str) -> Result<()> {
        expect_unit(
            self.executor.execute(Command::LoadMethod {
                name: name.to_string(),
            })?,
            "LoadMethod",
        )
    }

    /// Check whether a method has been prepared.
    pub fn is_method_loaded(&self, name: &str) -> Result<bool> {
        expect_bool(
            self.executor.execute(Command::IsMethodLoaded {
                name: name.to_string(),
            })?,
            "IsMethodLoaded",
        )
    }

    /// Signature of a method.
    pub fn method_meta(&self, name: &str) -> Result<MethodMeta> {
        match self.executor.execute(Command::MethodMeta {
            name: name.to_string(),
        })? {
            Output::MethodMeta(meta) => Ok(meta),
            other => Err(unexpected(&other, "MethodMeta")),
        }
    }

    /// Run a method on the caller's thread.
    pub fn execute(&self, method: &str, args: Vec<HostValue>) -> Result<Vec<HostValue>> {
        expect_values(
            self.executor.execute(Command::Execute {
                method: method.to_string(),
                args,
            })?,
        )
    }

    /// Run a method on the execution bridge.
    pub fn execute_async(&self, method: &str, args: Vec<HostValue>) -> Pending<Vec<HostValue>> {
        self.executor.submit_map(
            Command::Execute {
                method: method.to_string(),
                args,
            },
            expect_values,
        )
    }

    /// Run the `forward` method.
    pub fn forward(&self, args: Vec<HostValue>) -> Result<Vec<HostValue>> {
        self.execute(FORWARD, args)
    }

    /// Run the `forward` method on the execution bridge.
    pub fn forward_async(&self, args: Vec<HostValue>) -> Pending<Vec<HostValue>> {
        self.execute_async(FORWARD, args)
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("source", self.executor.source())
            .finish()
    }
}

fn expect_unit(output: Output, command: &str) -> Result<()> {
    match output {
        Output::Unit => Ok(()),
        other => Err(unexpected(&other, command)),
    }
}

fn expect_bool(output: Output, command: &str) -> Result<bool> {
    match output {
        Output::Bool(b) => Ok(b),
        other => Err(unexpected(&other, command)),
    }
}

fn expect_values(output: Output) -> Result<Vec<HostValue>> {
    match output {
        Output::Values(values) => Ok(values),
        other => Err(unexpected(&other, "Execute")),
    }
}

fn unexpected(output: &Output, command: &str) -> Error {
    Error::InvalidArgument(format!(
        "unexpected {} output for {}",
        output.kind(),
        command
    ))
}
