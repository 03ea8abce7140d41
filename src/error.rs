//! Host-facing errors
//!
//! Internally every crate returns [`Error`]. At the host boundary errors are
//! presented as a [`HostError`]: a kind the host can branch on, a stable
//! code, a message and optional structured details.
//!
//! ## Kinds
//!
//! | Kind | Raised for | Code |
//! |------|------------|------|
//! | ArgumentError | malformed input, caught before any engine call | InvalidArgument |
//! | EngineError | the engine's own failures, passed through | engine code name |
//! | BridgeError | queueing, shutdown, abandonment, panics | Abandoned, QueueFull, ... |
//! | UnsupportedTagError | engine values this layer cannot decode | NotImplemented |

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub use tensorbridge_core::{BridgeError, EngineError, Error, ErrorCode, Result};

use tensorbridge_core::HostValue;

/// Error class exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input was wrong
    ArgumentError,
    /// The engine failed
    EngineError,
    /// The execution bridge failed
    BridgeError,
    /// The engine produced something this layer cannot decode
    UnsupportedTagError,
}

impl ErrorKind {
    /// Name as seen by the host
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ArgumentError => "ArgumentError",
            ErrorKind::EngineError => "EngineError",
            ErrorKind::BridgeError => "BridgeError",
            ErrorKind::UnsupportedTagError => "UnsupportedTagError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The exception a host sees.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct HostError {
    /// Error class
    pub kind: ErrorKind,
    /// Stable code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Structured details as a `HostValue::Object`
    pub details: Option<HostValue>,
}

impl HostError {
    /// Export to a host object with `kind`, `code`, `message` and, when
    /// present, `details`.
    pub fn to_host_value(&self) -> HostValue {
        let mut obj = HashMap::new();
        obj.insert("kind".to_string(), HostValue::from(self.kind.as_str()));
        obj.insert("code".to_string(), HostValue::from(self.code.as_str()));
        obj.insert("message".to_string(), HostValue::from(self.message.as_str()));
        if let Some(details) = &self.details {
            obj.insert("details".to_string(), details.clone());
        }
        HostValue::Object(obj)
    }
}

impl From<Error> for HostError {
    fn from(e: Error) -> Self {
        let code = e.code().to_string();
        match e {
            Error::InvalidArgument(message) => HostError {
                kind: ErrorKind::ArgumentError,
                code,
                message,
                details: None,
            },
            Error::Engine(engine) => {
                let mut details = HashMap::new();
                details.insert(
                    "engineCode".to_string(),
                    HostValue::Int(i64::from(engine.code.raw())),
                );
                HostError {
                    kind: ErrorKind::EngineError,
                    code,
                    message: engine.message,
                    details: Some(HostValue::Object(details)),
                }
            }
            Error::Bridge(bridge) => {
                let details = match &bridge {
                    BridgeError::QueueFull { capacity } => {
                        let mut obj = HashMap::new();
                        obj.insert("capacity".to_string(), HostValue::Int(*capacity as i64));
                        Some(HostValue::Object(obj))
                    }
                    _ => None,
                };
                HostError {
                    kind: ErrorKind::BridgeError,
                    code,
                    message: bridge.to_string(),
                    details,
                }
            }
            Error::UnsupportedTag { tag } => {
                let mut obj = HashMap::new();
                obj.insert("tag".to_string(), HostValue::from(tag.as_str()));
                HostError {
                    kind: ErrorKind::UnsupportedTagError,
                    code,
                    message: format!("unsupported tag: {}", tag),
                    details: Some(HostValue::Object(obj)),
                }
            }
        }
    }
}
