//! Scalar element kinds for tensors
//!
//! `ScalarType` mirrors the engine's dtype enumeration, including its stable
//! numeric codes. Only the kinds this layer can encode and decode element by
//! element are represented; complex and quantized kinds are rejected by
//! [`ScalarType::from_code`].
//!
//! ## Codes
//!
//! | Kind | Code | Item size |
//! |------|------|-----------|
//! | Byte (u8) | 0 | 1 |
//! | Char (i8) | 1 | 1 |
//! | Short (i16) | 2 | 2 |
//! | Int (i32) | 3 | 4 |
//! | Long (i64) | 4 | 8 |
//! | Half (f16) | 5 | 2 |
//! | Float (f32) | 6 | 4 |
//! | Double (f64) | 7 | 8 |
//! | Bool | 11 | 1 |
//! | BFloat16 | 15 | 2 |
//! | UInt16 | 27 | 2 |
//! | UInt32 | 28 | 4 |
//! | UInt64 | 29 | 8 |

use half::{bf16, f16};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Element kind of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ScalarType {
    /// Unsigned 8-bit integer
    Byte = 0,
    /// Signed 8-bit integer
    Char = 1,
    /// Signed 16-bit integer
    Short = 2,
    /// Signed 32-bit integer
    Int = 3,
    /// Signed 64-bit integer
    Long = 4,
    /// IEEE-754 half precision
    Half = 5,
    /// IEEE-754 single precision
    Float = 6,
    /// IEEE-754 double precision
    Double = 7,
    /// Boolean stored as one byte (0 or 1)
    Bool = 11,
    /// Brain floating point (8-bit exponent, 7-bit mantissa)
    BFloat16 = 15,
    /// Unsigned 16-bit integer
    UInt16 = 27,
    /// Unsigned 32-bit integer
    UInt32 = 28,
    /// Unsigned 64-bit integer
    UInt64 = 29,
}

impl ScalarType {
    /// Every supported kind, in code order.
    pub const ALL: [ScalarType; 13] = [
        ScalarType::Byte,
        ScalarType::Char,
        ScalarType::Short,
        ScalarType::Int,
        ScalarType::Long,
        ScalarType::Half,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Bool,
        ScalarType::BFloat16,
        ScalarType::UInt16,
        ScalarType::UInt32,
        ScalarType::UInt64,
    ];

    /// The engine's numeric code for this kind
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Resolve an engine code.
    ///
    /// Fails with `InvalidArgument` for codes outside the supported set.
    pub fn from_code(code: i32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or_else(|| Error::InvalidArgument(format!("unsupported dtype code {}", code)))
    }

    /// Constant name as exposed to the host
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Byte => "Byte",
            ScalarType::Char => "Char",
            ScalarType::Short => "Short",
            ScalarType::Int => "Int",
            ScalarType::Long => "Long",
            ScalarType::Half => "Half",
            ScalarType::Float => "Float",
            ScalarType::Double => "Double",
            ScalarType::Bool => "Bool",
            ScalarType::BFloat16 => "BFloat16",
            ScalarType::UInt16 => "UInt16",
            ScalarType::UInt32 => "UInt32",
            ScalarType::UInt64 => "UInt64",
        }
    }

    /// Resolve a constant name (the inverse of [`ScalarType::name`])
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Size of one element in bytes
    pub fn element_size(self) -> usize {
        match self {
            ScalarType::Byte | ScalarType::Char | ScalarType::Bool => 1,
            ScalarType::Short | ScalarType::Half | ScalarType::BFloat16 | ScalarType::UInt16 => 2,
            ScalarType::Int | ScalarType::Float | ScalarType::UInt32 => 4,
            ScalarType::Long | ScalarType::Double | ScalarType::UInt64 => 8,
        }
    }

    /// True for Half, Float, Double and BFloat16
    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            ScalarType::Half | ScalarType::Float | ScalarType::Double | ScalarType::BFloat16
        )
    }

    /// Write `value`, cast to this kind, into `out` (native byte order).
    ///
    /// `out` must be exactly `element_size()` bytes long.
    pub fn encode_f64(self, value: f64, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.element_size());
        match self {
            ScalarType::Byte => out.copy_from_slice(&(value as u8).to_ne_bytes()),
            ScalarType::Char => out.copy_from_slice(&(value as i8).to_ne_bytes()),
            ScalarType::Short => out.copy_from_slice(&(value as i16).to_ne_bytes()),
            ScalarType::Int => out.copy_from_slice(&(value as i32).to_ne_bytes()),
            ScalarType::Long => out.copy_from_slice(&(value as i64).to_ne_bytes()),
            ScalarType::Half => out.copy_from_slice(&f16::from_f64(value).to_ne_bytes()),
            ScalarType::Float => out.copy_from_slice(&(value as f32).to_ne_bytes()),
            ScalarType::Double => out.copy_from_slice(&value.to_ne_bytes()),
            ScalarType::Bool => out[0] = u8::from(value != 0.0),
            ScalarType::BFloat16 => out.copy_from_slice(&bf16::from_f64(value).to_ne_bytes()),
            ScalarType::UInt16 => out.copy_from_slice(&(value as u16).to_ne_bytes()),
            ScalarType::UInt32 => out.copy_from_slice(&(value as u32).to_ne_bytes()),
            ScalarType::UInt64 => out.copy_from_slice(&(value as u64).to_ne_bytes()),
        }
    }

    /// Read one element of this kind from `bytes` (native byte order).
    ///
    /// Integer kinds decode to `Scalar::Int`, floating kinds to
    /// `Scalar::Double`, Bool to `Scalar::Bool`. UInt64 values above
    /// `i64::MAX` saturate.
    pub fn decode(self, bytes: &[u8]) -> Scalar {
        debug_assert_eq!(bytes.len(), self.element_size());
        match self {
            ScalarType::Byte => Scalar::Int(i64::from(bytes[0])),
            ScalarType::Char => Scalar::Int(i64::from(i8::from_ne_bytes([bytes[0]]))),
            ScalarType::Short => Scalar::Int(i64::from(i16::from_ne_bytes(array(bytes)))),
            ScalarType::Int => Scalar::Int(i64::from(i32::from_ne_bytes(array(bytes)))),
            ScalarType::Long => Scalar::Int(i64::from_ne_bytes(array(bytes))),
            ScalarType::Half => Scalar::Double(f16::from_ne_bytes(array(bytes)).to_f64()),
            ScalarType::Float => Scalar::Double(f64::from(f32::from_ne_bytes(array(bytes)))),
            ScalarType::Double => Scalar::Double(f64::from_ne_bytes(array(bytes))),
            ScalarType::Bool => Scalar::Bool(bytes[0] != 0),
            ScalarType::BFloat16 => Scalar::Double(bf16::from_ne_bytes(array(bytes)).to_f64()),
            ScalarType::UInt16 => Scalar::Int(i64::from(u16::from_ne_bytes(array(bytes)))),
            ScalarType::UInt32 => Scalar::Int(i64::from(u32::from_ne_bytes(array(bytes)))),
            ScalarType::UInt64 => {
                let v = u64::from_ne_bytes(array(bytes));
                Scalar::Int(i64::try_from(v).unwrap_or(i64::MAX))
            }
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Size in bytes of one element of `dtype`
pub fn element_size(dtype: ScalarType) -> usize {
    dtype.element_size()
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
