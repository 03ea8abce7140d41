//! Convenient imports for tensorbridge.
//!
//! ```ignore
//! use tensorbridge::prelude::*;
//!
//! let module = Module::new(ModelSource::file("model.pte"), engine)?;
//! module.load()?;
//! ```

// Model handle
pub use crate::{Module, ModuleBuilder, ModelSource, Verification, FORWARD};

// Error handling
pub use crate::{Error, HostError, Result};

// Tensors and values
pub use crate::{HostValue, ScalarType, Tensor, TensorInit, TypedBuffer};

// Background execution
pub use crate::{BridgeConfig, Pending};

// Sampling and capabilities
pub use crate::{backends, sample, SampleOptions};
