//! Backend capability discovery
//!
//! Hosts query the capability record to learn which execution backends were
//! compiled in and how the library was built.

use serde::{Deserialize, Serialize};

/// Build configuration of the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildConfig {
    /// Built with debug assertions
    Debug,
    /// Optimized build
    Release,
}

impl BuildConfig {
    /// The configuration of the running binary
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildConfig::Debug
        } else {
            BuildConfig::Release
        }
    }
}

/// Available backends and build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Portable CPU kernels (always available)
    pub cpu: bool,
    /// Core ML delegate
    pub coreml: bool,
    /// Metal Performance Shaders delegate
    pub mps: bool,
    /// XNNPACK delegate
    pub xnnpack: bool,
    /// Build configuration
    pub config: BuildConfig,
}

impl Capabilities {
    /// CPU-only record for the current build configuration.
    pub fn cpu_only() -> Self {
        Capabilities {
            cpu: true,
            coreml: false,
            mps: false,
            xnnpack: false,
            config: BuildConfig::current(),
        }
    }

    /// Names of the enabled backends
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("cpu", self.cpu),
            ("coreml", self.coreml),
            ("mps", self.mps),
            ("xnnpack", self.xnnpack),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}
