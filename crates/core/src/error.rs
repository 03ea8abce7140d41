//! Error types shared by every tensorbridge crate
//!
//! ## Taxonomy
//!
//! | Class | Variant | Raised by |
//! |-------|---------|-----------|
//! | ArgumentError | `Error::InvalidArgument` | Tensor construction, codec, invoker (before any engine call) |
//! | EngineError | `Error::Engine` | The engine, passed through verbatim |
//! | BridgeError | `Error::Bridge` | Submission failure or abandoned work |
//! | UnsupportedTagError | `Error::UnsupportedTag` | Codec, for tags it cannot decode |
//!
//! ## Engine Codes (Canonical)
//!
//! These numeric codes are the engine's own and must not change:
//!
//! | Code | Name |
//! |------|------|
//! | 1 | Internal |
//! | 2 | InvalidState |
//! | 3 | EndOfMethod |
//! | 16 | NotSupported |
//! | 17 | NotImplemented |
//! | 18 | InvalidArgument |
//! | 19 | InvalidType |
//! | 20 | OperatorMissing |
//! | 32 | NotFound |
//! | 33 | MemoryAllocationFailed |
//! | 34 | AccessFailed |
//! | 35 | InvalidProgram |
//! | 48 | DelegateInvalidCompatibility |
//! | 49 | DelegateMemoryAllocationFailed |
//! | 50 | DelegateInvalidHandle |

use thiserror::Error;

/// Engine result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An internal error occurred
    Internal,
    /// Executor is in an invalid state for a target operation
    InvalidState,
    /// There are no more steps of execution to run
    EndOfMethod,
    /// Operation is not supported in the current context
    NotSupported,
    /// Operation is not yet implemented
    NotImplemented,
    /// User provided an invalid argument
    InvalidArgument,
    /// Object is an invalid type for the operation
    InvalidType,
    /// Operator(s) missing in the operator registry
    OperatorMissing,
    /// Requested resource could not be found
    NotFound,
    /// Could not allocate the requested memory
    MemoryAllocationFailed,
    /// Could not access a resource
    AccessFailed,
    /// Error caused by the contents of a program
    InvalidProgram,
    /// Backend receives an incompatible delegate version
    DelegateInvalidCompatibility,
    /// Backend fails to allocate memory
    DelegateMemoryAllocationFailed,
    /// The handle is invalid
    DelegateInvalidHandle,
    /// A code this layer does not know
    Unknown(u32),
}

impl ErrorCode {
    /// Resolve a raw engine code
    pub fn from_raw(code: u32) -> Self {
        match code {
            1 => ErrorCode::Internal,
            2 => ErrorCode::InvalidState,
            3 => ErrorCode::EndOfMethod,
            16 => ErrorCode::NotSupported,
            17 => ErrorCode::NotImplemented,
            18 => ErrorCode::InvalidArgument,
            19 => ErrorCode::InvalidType,
            20 => ErrorCode::OperatorMissing,
            32 => ErrorCode::NotFound,
            33 => ErrorCode::MemoryAllocationFailed,
            34 => ErrorCode::AccessFailed,
            35 => ErrorCode::InvalidProgram,
            48 => ErrorCode::DelegateInvalidCompatibility,
            49 => ErrorCode::DelegateMemoryAllocationFailed,
            50 => ErrorCode::DelegateInvalidHandle,
            other => ErrorCode::Unknown(other),
        }
    }

    /// The raw engine code
    pub fn raw(self) -> u32 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::InvalidState => 2,
            ErrorCode::EndOfMethod => 3,
            ErrorCode::NotSupported => 16,
            ErrorCode::NotImplemented => 17,
            ErrorCode::InvalidArgument => 18,
            ErrorCode::InvalidType => 19,
            ErrorCode::OperatorMissing => 20,
            ErrorCode::NotFound => 32,
            ErrorCode::MemoryAllocationFailed => 33,
            ErrorCode::AccessFailed => 34,
            ErrorCode::InvalidProgram => 35,
            ErrorCode::DelegateInvalidCompatibility => 48,
            ErrorCode::DelegateMemoryAllocationFailed => 49,
            ErrorCode::DelegateInvalidHandle => 50,
            ErrorCode::Unknown(raw) => raw,
        }
    }

    /// Stable code name
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Internal => "Internal",
            ErrorCode::InvalidState => "InvalidState",
            ErrorCode::EndOfMethod => "EndOfMethod",
            ErrorCode::NotSupported => "NotSupported",
            ErrorCode::NotImplemented => "NotImplemented",
            ErrorCode::InvalidArgument => "InvalidArgument",
            ErrorCode::InvalidType => "InvalidType",
            ErrorCode::OperatorMissing => "OperatorMissing",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::MemoryAllocationFailed => "MemoryAllocationFailed",
            ErrorCode::AccessFailed => "AccessFailed",
            ErrorCode::InvalidProgram => "InvalidProgram",
            ErrorCode::DelegateInvalidCompatibility => "DelegateInvalidCompatibility",
            ErrorCode::DelegateMemoryAllocationFailed => "DelegateMemoryAllocationFailed",
            ErrorCode::DelegateInvalidHandle => "DelegateInvalidHandle",
            ErrorCode::Unknown(_) => "Unknown",
        }
    }

    /// Default human-readable description
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::Internal => "An internal error occurred",
            ErrorCode::InvalidState => "Executor is in an invalid state for a target operation",
            ErrorCode::EndOfMethod => "There are no more steps of execution to run",
            ErrorCode::NotSupported => "Operation is not supported in the current context",
            ErrorCode::NotImplemented => "Operation is not yet implemented",
            ErrorCode::InvalidArgument => "User provided an invalid argument",
            ErrorCode::InvalidType => "Object is an invalid type for the operation",
            ErrorCode::OperatorMissing => "Operator(s) missing in the operator registry",
            ErrorCode::NotFound => "Requested resource could not be found",
            ErrorCode::MemoryAllocationFailed => "Could not allocate the requested memory",
            ErrorCode::AccessFailed => "Could not access a resource",
            ErrorCode::InvalidProgram => "Error caused by the contents of a program",
            ErrorCode::DelegateInvalidCompatibility => {
                "Backend receives an incompatible delegate version"
            }
            ErrorCode::DelegateMemoryAllocationFailed => "Backend fails to allocate memory",
            ErrorCode::DelegateInvalidHandle => "The handle is invalid",
            ErrorCode::Unknown(_) => "Unknown error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An engine failure, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct EngineError {
    /// Stable engine code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl EngineError {
    /// Create an engine error with a specific message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an engine error carrying the code's default message
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}

/// Failures of the background execution bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The completion slot was released before the work resolved it
    #[error("execution abandoned")]
    Abandoned,

    /// The bridge queue is at capacity
    #[error("execution queue is full ({capacity} pending units)")]
    QueueFull {
        /// Configured queue depth
        capacity: usize,
    },

    /// The bridge was shut down before the submission
    #[error("execution bridge is shut down")]
    ShutDown,

    /// The work function panicked
    #[error("execution panicked: {0}")]
    Panicked(String),

    /// A worker thread could not be started
    #[error("failed to spawn worker: {0}")]
    WorkerSpawn(String),
}

impl BridgeError {
    /// Stable code name
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Abandoned => "Abandoned",
            BridgeError::QueueFull { .. } => "QueueFull",
            BridgeError::ShutDown => "ShutDown",
            BridgeError::Panicked(_) => "Panicked",
            BridgeError::WorkerSpawn(_) => "WorkerSpawn",
        }
    }
}

/// All tensorbridge errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed input detected before any engine call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine's own failure
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Submission or completion failure of the execution bridge
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The engine produced, or a signature declared, a tag this layer cannot handle
    #[error("unsupported tag: {tag}")]
    UnsupportedTag {
        /// Tag name or raw code
        tag: String,
    },
}

/// Result type for tensorbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable code for the error
    ///
    /// Engine errors report the engine code, argument errors
    /// "InvalidArgument", unsupported tags "NotImplemented".
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::Engine(e) => e.code.as_str(),
            Error::Bridge(e) => e.code(),
            Error::UnsupportedTag { .. } => "NotImplemented",
        }
    }

    /// Check if this is an argument error.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Check if this error came from the engine.
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Error::Engine(_))
    }

    /// Check if this error came from the execution bridge.
    pub fn is_bridge_error(&self) -> bool {
        matches!(self, Error::Bridge(_))
    }

    /// Check if this is an abandoned-execution error.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Bridge(BridgeError::Abandoned))
    }

    /// Engine code, when this is an engine error
    pub fn engine_code(&self) -> Option<ErrorCode> {
        match self {
            Error::Engine(e) => Some(e.code),
            _ => None,
        }
    }
}
