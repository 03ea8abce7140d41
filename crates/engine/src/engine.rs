//! The engine trait
//!
//! One `Engine` instance backs one model handle. Operations that change the
//! engine's loaded state take `&mut self`; reads and execution take `&self`
//! so a loaded engine can serve concurrent executions.

use tensorbridge_core::{EngineError, MethodMeta, TaggedValue};

use crate::source::{ProgramData, Verification};

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// A tensor inference engine instance.
pub trait Engine: Send + Sync {
    /// Parse and verify a program.
    fn load_program(&mut self, program: &ProgramData, verification: Verification)
        -> EngineResult<()>;

    /// Names of the methods in the loaded program.
    fn method_names(&self) -> EngineResult<Vec<String>>;

    /// Prepare a method for execution.
    fn load_method(&mut self, name: &str) -> EngineResult<()>;

    /// Signature of a method.
    fn method_meta(&self, name: &str) -> EngineResult<MethodMeta>;

    /// Execute a loaded method.
    ///
    /// Tensor results may reference engine-owned memory that is reused by
    /// the next call; callers must detach them before returning to the host.
    fn execute_method(&self, name: &str, args: &[TaggedValue]) -> EngineResult<Vec<TaggedValue>>;
}

