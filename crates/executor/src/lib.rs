//! Method invocation and command execution for tensorbridge
//!
//! This crate ties the codec, the engine boundary and the execution bridge
//! together:
//! - `MethodInvoker`: validate-before-call method invocation
//! - `Command` / `Output` / `Executor`: one dispatch path for inline and
//!   background execution
//! - `Module`: typed handle over a model program

#![warn(missing_docs)]
#![warn(clippy::all)]

mod api;
mod command;
mod executor;
mod handlers;
mod invoke;

#[cfg(test)]
mod tests;

pub use api::{Module, ModuleBuilder, FORWARD};
pub use command::{Command, Output};
pub use executor::{Executor, ModuleOptions};
pub use invoke::MethodInvoker;
