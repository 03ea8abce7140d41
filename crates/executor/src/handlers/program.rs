//! Program-level handlers: load, is_loaded, method_names

use tensorbridge_core::Result;
use tensorbridge_engine::{ProgramData, Verification};
use tracing::info;

use super::require_loaded;
use crate::command::Output;
use crate::executor::Shared;

/// Handle Load command.
///
/// Reads the program bytes, hands them to the engine and forgets any
/// previously loaded methods.
pub(crate) fn load(shared: &Shared, verification: Option<Verification>) -> Result<Output> {
    let verification = verification.unwrap_or(shared.options.verification);
    info!(source = ?shared.source, %verification, "Loading model");

    let program = ProgramData::load(&shared.source)?;
    let mut state = shared.state.write();
    state.loaded = false;
    state.loaded_methods.clear();
    state.engine.load_program(&program, verification)?;
    state.loaded = true;

    info!(source = ?shared.source, bytes = program.len(), "Model loaded");
    Ok(Output::Unit)
}

/// Handle IsLoaded command.
pub(crate) fn is_loaded(shared: &Shared) -> Result<Output> {
    Ok(Output::Bool(shared.state.read().loaded))
}

/// Handle MethodNames command.
pub(crate) fn method_names(shared: &Shared) -> Result<Output> {
    let state = shared.state.read();
    require_loaded(&state)?;
    Ok(Output::Names(state.engine.method_names()?))
}
