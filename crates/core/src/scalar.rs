//! Scalar wrapper for bool/number values
//!
//! A `Scalar` marks a host value as a standalone scalar rather than a tensor
//! element. It is also what tensor element reads decode to.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::HostValue;

/// A bool, integer or floating point scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Double(f64),
}

impl Scalar {
    /// Build a scalar from a host value.
    ///
    /// Accepts Bool, Int, Float or an existing Scalar; anything else fails
    /// with `InvalidArgument`.
    pub fn from_host(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Bool(b) => Ok(Scalar::Bool(*b)),
            HostValue::Int(i) => Ok(Scalar::Int(*i)),
            HostValue::Float(f) => Ok(Scalar::Double(*f)),
            HostValue::Scalar(s) => Ok(*s),
            other => Err(Error::InvalidArgument(format!(
                "expected Boolean or Number, got {}",
                other.type_name()
            ))),
        }
    }

    /// Numeric view (bools map to 0 / 1)
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Bool(b) => f64::from(u8::from(b)),
            Scalar::Int(i) => i as f64,
            Scalar::Double(d) => d,
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "Bool",
            Scalar::Int(_) => "Int",
            Scalar::Double(_) => "Double",
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(d: f64) -> Self {
        Scalar::Double(d)
    }
}

impl From<Scalar> for HostValue {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Bool(b) => HostValue::Bool(b),
            Scalar::Int(i) => HostValue::Int(i),
            Scalar::Double(d) => HostValue::Float(d),
        }
    }
}
