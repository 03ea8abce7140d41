//! Inference engine boundary for tensorbridge
//!
//! The engine itself (program loader, kernels, executor) lives outside this
//! workspace. This crate fixes the interface the bridge consumes:
//! - [`Engine`]: load a program, list and load methods, read signatures,
//!   execute a method over tagged values
//! - [`ModelSource`] / [`ProgramData`]: where program bytes come from
//! - [`Verification`]: how strictly the engine checks a program on load

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod source;

pub use engine::{Engine, EngineResult};
pub use source::{ModelSource, ProgramData, Verification};
