//! Compiled-in backend report

use once_cell::sync::Lazy;
use tensorbridge_core::{BuildConfig, Capabilities};

static BACKENDS: Lazy<Capabilities> = Lazy::new(|| Capabilities {
    cpu: true,
    coreml: cfg!(feature = "coreml"),
    mps: cfg!(feature = "mps"),
    xnnpack: cfg!(feature = "xnnpack"),
    config: BuildConfig::current(),
});

/// Backends compiled into this build. Computed once per process.
pub fn backends() -> &'static Capabilities {
    &BACKENDS
}
