//! # tensorbridge
//!
//! Binding layer between a host runtime and a tensor inference engine.
//!
//! tensorbridge moves tensors and tagged values across the engine boundary,
//! checks method arguments against their declared signatures before the
//! engine sees them, and runs engine work on a background pool so a host
//! thread can await results instead of blocking.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tensorbridge::prelude::*;
//!
//! let module = Module::builder(ModelSource::file("model.pte"))
//!     .engine(engine)
//!     .build()?;
//! module.load()?;
//!
//! let input = Tensor::new(TensorInit::nested(rows))?;
//! let outputs = module.forward_async(vec![input.into()]).await?;
//!
//! let token = sample(&Tensor::try_from(&outputs[0])?, &SampleOptions::new())?;
//! ```
//!
//! ## Layers
//!
//! - [`Tensor`] - host tensors over borrowed or owned buffers
//! - [`codec`] - host values to and from engine tagged values
//! - [`Module`] - typed handle over one model program
//! - [`ExecutionBridge`] - worker pool behind the `_async` methods
//! - [`concurrency`] - pending handles and their completers
//! - [`HostError`] - what the host sees when something fails

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backends;
mod error;
mod sample;
mod tensor;

pub mod prelude;

pub use tensorbridge_codec as codec;
pub use tensorbridge_concurrency as concurrency;

pub use backends::backends;
pub use error::{BridgeError, EngineError, Error, ErrorCode, ErrorKind, HostError, Result};
pub use sample::{sample, SampleOptions, Sampler};
pub use tensor::{Tensor, TensorData, TensorInit, TypedVec};

pub use tensorbridge_concurrency::{
    default_bridge, BridgeConfig, ExecutionBridge, Pending, PendingState,
};
pub use tensorbridge_core::{
    element_size, BuildConfig, Capabilities, HostValue, MethodMeta, Ownership, Scalar, ScalarType,
    Tag, TaggedValue, TensorInfo, TensorView, TypedBuffer,
};
pub use tensorbridge_engine::{Engine, EngineResult, ModelSource, ProgramData, Verification};
pub use tensorbridge_executor::{
    Command, Executor, MethodInvoker, Module, ModuleBuilder, ModuleOptions, Output, FORWARD,
};
