//! Command handlers
//!
//! Program-level commands live in [`program`], method-level commands in
//! [`method`].

pub(crate) mod method;
pub(crate) mod program;

use tensorbridge_core::{EngineError, ErrorCode, Result};

use crate::executor::ModelState;

/// Fail with the engine's `InvalidState` unless the program is loaded.
pub(crate) fn require_loaded(state: &ModelState) -> Result<()> {
    if state.loaded {
        Ok(())
    } else {
        Err(EngineError::new(ErrorCode::InvalidState, "model is not loaded").into())
    }
}
