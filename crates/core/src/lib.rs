//! Core types for tensorbridge
//!
//! This crate defines the values that cross the boundary between a host
//! runtime and the inference engine:
//! - `ScalarType`: element kinds with the engine's stable codes
//! - `TypedBuffer`: byte region plus ownership tag
//! - `TensorView`: dtype, shape, dim-order and strides over a buffer
//! - `Tag` / `TaggedValue`: the engine's tagged union
//! - `HostValue` / `Scalar`: the host's dynamic values
//! - `MethodMeta` / `TensorInfo`: method signatures
//! - `Error`: the error taxonomy shared by every crate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod capabilities;
pub mod dtype;
pub mod error;
pub mod host;
pub mod meta;
pub mod scalar;
pub mod tensor;
pub mod value;

pub use buffer::{Ownership, TypedBuffer};
pub use capabilities::{BuildConfig, Capabilities};
pub use dtype::{element_size, ScalarType};
pub use error::{BridgeError, EngineError, Error, ErrorCode, Result};
pub use host::HostValue;
pub use meta::{MethodMeta, TensorInfo};
pub use scalar::Scalar;
pub use tensor::TensorView;
pub use value::{Tag, TaggedValue};
