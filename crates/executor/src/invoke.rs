//! Method invocation
//!
//! [`MethodInvoker`] turns a method name and host arguments into an engine
//! call and back. All argument checking happens before the engine is
//! touched, so a malformed call never partially applies.
//!
//! ## Steps
//!
//! 1. Look up the signature (engine `NotFound` for unknown methods)
//! 2. Check the argument count
//! 3. Convert each argument to its declared tag; optionally check tensor
//!    dtype and rank against the signature
//! 4. Execute
//! 5. Detach engine tensors and convert results to host values
//!
//! Engine failures pass through unchanged.

use tensorbridge_codec::{from_tagged, to_tagged};
use tensorbridge_core::{Error, HostValue, MethodMeta, Result, Tag, TaggedValue};
use tensorbridge_engine::Engine;
use tracing::debug;

/// Validates, converts and dispatches method calls on one engine.
pub struct MethodInvoker<'a> {
    engine: &'a dyn Engine,
    check_tensor_meta: bool,
}

impl<'a> MethodInvoker<'a> {
    /// Invoker over `engine`, with tensor metadata checks on.
    pub fn new(engine: &'a dyn Engine) -> Self {
        Self {
            engine,
            check_tensor_meta: true,
        }
    }

    /// Enable or disable dtype / rank checks against the signature.
    pub fn check_tensor_meta(mut self, enabled: bool) -> Self {
        self.check_tensor_meta = enabled;
        self
    }

    /// Call `method` with `args`.
    pub fn invoke(&self, method: &str, args: &[HostValue]) -> Result<Vec<HostValue>> {
        let tagged = self.prepare_call(method, args)?;
        self.call(method, &tagged)
    }

    /// Look up the signature of `method` and convert `args` against it.
    pub fn prepare_call(&self, method: &str, args: &[HostValue]) -> Result<Vec<TaggedValue>> {
        let meta = self.engine.method_meta(method)?;
        self.prepare(&meta, args)
    }

    /// Execute already converted arguments and decode the results.
    pub fn call(&self, method: &str, tagged: &[TaggedValue]) -> Result<Vec<HostValue>> {
        debug!(method, args = tagged.len(), "Invoking method");
        let results = self.engine.execute_method(method, tagged)?;
        debug!(method, outputs = results.len(), "Method returned");

        results
            .iter()
            .map(|value| from_tagged(&value.detach()))
            .collect()
    }

    /// Convert `args` against `meta` without calling the engine.
    pub fn prepare(&self, meta: &MethodMeta, args: &[HostValue]) -> Result<Vec<TaggedValue>> {
        if args.len() != meta.num_inputs() {
            return Err(Error::InvalidArgument(format!(
                "wrong number of arguments for '{}': expected {}, got {}",
                meta.name(),
                meta.num_inputs(),
                args.len()
            )));
        }

        args.iter()
            .enumerate()
            .map(|(index, arg)| {
                let tag = meta.input_tag(index)?;
                let value = to_tagged(arg, tag).map_err(|e| argument_error(index, tag, e))?;
                if self.check_tensor_meta {
                    self.check_tensor(meta, index, &value)?;
                }
                Ok(value)
            })
            .collect()
    }

    fn check_tensor(&self, meta: &MethodMeta, index: usize, value: &TaggedValue) -> Result<()> {
        let (Some(tensor), Some(info)) = (value.as_tensor(), meta.input_tensor_meta(index)?) else {
            return Ok(());
        };
        if tensor.dtype() != info.scalar_type {
            return Err(Error::InvalidArgument(format!(
                "argument {} (Tensor): expected dtype {}, got {}",
                index,
                info.scalar_type,
                tensor.dtype()
            )));
        }
        if tensor.dim() != info.sizes.len() {
            return Err(Error::InvalidArgument(format!(
                "argument {} (Tensor): expected rank {}, got {}",
                index,
                info.sizes.len(),
                tensor.dim()
            )));
        }
        Ok(())
    }
}

fn argument_error(index: usize, tag: Tag, err: Error) -> Error {
    let detail = match err {
        Error::InvalidArgument(msg) => msg,
        other => other.to_string(),
    };
    Error::InvalidArgument(format!("argument {} ({}): {}", index, tag, detail))
}
