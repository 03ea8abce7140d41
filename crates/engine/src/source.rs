//! Program sources and verification modes

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tensorbridge_core::{EngineError, Error, ErrorCode};
use tracing::debug;

/// Where a model's program bytes come from.
#[derive(Clone)]
pub enum ModelSource {
    /// A file on disk, read when the model is loaded
    File(PathBuf),
    /// An in-memory buffer supplied by the host
    Buffer(Arc<[u8]>),
}

impl ModelSource {
    /// Source backed by a file path
    pub fn file(path: impl AsRef<Path>) -> Self {
        ModelSource::File(path.as_ref().to_path_buf())
    }

    /// Source backed by an in-memory buffer
    pub fn buffer(bytes: impl Into<Arc<[u8]>>) -> Self {
        ModelSource::Buffer(bytes.into())
    }
}

impl fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::File(path) => f.debug_tuple("File").field(path).finish(),
            ModelSource::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
        }
    }
}

/// Program bytes ready to hand to the engine.
#[derive(Clone)]
pub struct ProgramData {
    bytes: Arc<[u8]>,
    origin: Option<PathBuf>,
}

impl ProgramData {
    /// Read the program bytes from `source`.
    ///
    /// A missing file fails with the engine's `NotFound` code, any other
    /// I/O failure with `AccessFailed`.
    pub fn load(source: &ModelSource) -> Result<Self, EngineError> {
        match source {
            ModelSource::Buffer(bytes) => Ok(Self {
                bytes: Arc::clone(bytes),
                origin: None,
            }),
            ModelSource::File(path) => {
                debug!(path = %path.display(), "Reading program file");
                let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
                debug!(path = %path.display(), len = bytes.len(), "Read program file");
                Ok(Self {
                    bytes: Arc::from(bytes),
                    origin: Some(path.clone()),
                })
            }
        }
    }

    /// Program bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the program is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File the bytes were read from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

impl fmt::Debug for ProgramData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramData")
            .field("len", &self.bytes.len())
            .field("origin", &self.origin)
            .finish()
    }
}

fn io_error(path: &Path, err: io::Error) -> EngineError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => ErrorCode::NotFound,
        _ => ErrorCode::AccessFailed,
    };
    EngineError::new(code, format!("{}: {}", path.display(), err))
}

/// How thoroughly the engine verifies a program when loading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verification {
    /// Structural checks only
    #[default]
    Minimal,
    /// Full internal consistency checks
    InternalConsistency,
}

impl Verification {
    /// Host-facing name
    pub fn as_str(self) -> &'static str {
        match self {
            Verification::Minimal => "minimal",
            Verification::InternalConsistency => "internal-consistency",
        }
    }
}

impl FromStr for Verification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Verification::Minimal),
            "internal-consistency" => Ok(Verification::InternalConsistency),
            other => Err(Error::InvalidArgument(format!(
                "unknown verification mode '{}', expected 'minimal' or 'internal-consistency'",
                other
            ))),
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
