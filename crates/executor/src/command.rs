//! Commands and outputs
//!
//! Every operation on a model handle is a [`Command`]; every successful
//! result is an [`Output`]. The synchronous and background paths dispatch
//! the same commands through the same handlers.

use tensorbridge_core::{HostValue, MethodMeta};
use tensorbridge_engine::Verification;

/// An operation on a model handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Read and verify the program; `None` uses the handle's default mode
    Load {
        /// Verification mode override
        verification: Option<Verification>,
    },
    /// Check whether the program is loaded
    IsLoaded,
    /// List the program's method names
    MethodNames,
    /// Prepare a method for execution
    LoadMethod {
        /// Method name
        name: String,
    },
    /// Check whether a method has been prepared
    IsMethodLoaded {
        /// Method name
        name: String,
    },
    /// Read a method's signature
    MethodMeta {
        /// Method name
        name: String,
    },
    /// Run a method over host arguments
    Execute {
        /// Method name
        method: String,
        /// Positional arguments
        args: Vec<HostValue>,
    },
}

impl Command {
    /// Command name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load { .. } => "Load",
            Command::IsLoaded => "IsLoaded",
            Command::MethodNames => "MethodNames",
            Command::LoadMethod { .. } => "LoadMethod",
            Command::IsMethodLoaded { .. } => "IsMethodLoaded",
            Command::MethodMeta { .. } => "MethodMeta",
            Command::Execute { .. } => "Execute",
        }
    }
}

/// The successful result of a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// No value
    Unit,
    /// A flag
    Bool(bool),
    /// Method names
    Names(Vec<String>),
    /// A method signature
    MethodMeta(MethodMeta),
    /// Method results
    Values(Vec<HostValue>),
}

impl Output {
    /// Variant name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Output::Unit => "Unit",
            Output::Bool(_) => "Bool",
            Output::Names(_) => "Names",
            Output::MethodMeta(_) => "MethodMeta",
            Output::Values(_) => "Values",
        }
    }
}
