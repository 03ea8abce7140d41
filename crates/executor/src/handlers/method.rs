//! Method-level handlers: load_method, is_method_loaded, method_meta, execute

use tensorbridge_core::{HostValue, Result};
use tracing::{debug, info};

use super::require_loaded;
use crate::command::Output;
use crate::executor::Shared;
use crate::invoke::MethodInvoker;

/// Handle LoadMethod command.
pub(crate) fn load_method(shared: &Shared, name: &str) -> Result<Output> {
    let mut state = shared.state.write();
    require_loaded(&state)?;
    if !state.loaded_methods.contains(name) {
        state.engine.load_method(name)?;
        state.loaded_methods.insert(name.to_string());
        info!(method = name, "Method loaded");
    }
    Ok(Output::Unit)
}

/// Handle IsMethodLoaded command.
pub(crate) fn is_method_loaded(shared: &Shared, name: &str) -> Result<Output> {
    Ok(Output::Bool(shared.state.read().loaded_methods.contains(name)))
}

/// Handle MethodMeta command.
pub(crate) fn method_meta(shared: &Shared, name: &str) -> Result<Output> {
    let state = shared.state.read();
    require_loaded(&state)?;
    Ok(Output::MethodMeta(state.engine.method_meta(name)?))
}

/// Handle Execute command.
///
/// Arguments are checked against the signature before anything else, so a
/// rejected call leaves the method unloaded. A method not yet loaded is
/// loaded under the exclusive lock, then invoked under the shared one.
pub(crate) fn execute(shared: &Shared, method: &str, args: &[HostValue]) -> Result<Output> {
    {
        let state = shared.state.read();
        require_loaded(&state)?;
        let invoker =
            MethodInvoker::new(&*state.engine).check_tensor_meta(shared.options.check_tensor_meta);
        let tagged = invoker.prepare_call(method, args)?;
        if state.loaded_methods.contains(method) {
            return invoker.call(method, &tagged).map(Output::Values);
        }
    }

    debug!(method, "Loading method before first execution");
    load_method(shared, method)?;

    // the program may have been reloaded while the lock was released
    let state = shared.state.read();
    require_loaded(&state)?;
    MethodInvoker::new(&*state.engine)
        .check_tensor_meta(shared.options.check_tensor_meta)
        .invoke(method, args)
        .map(Output::Values)
}
