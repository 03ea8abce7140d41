//! Dynamic host values
//!
//! `HostValue` is the host runtime's view of a value as it crosses into the
//! bridge: arguments arrive as `HostValue`s and results leave as them.
//!
//! ## Equality Rules
//!
//! - Different kinds are never equal (no coercion): `Int(1) != Float(1.0)`
//! - Floats use IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - `String("abc") != Bytes([97, 98, 99])`
//! - Tensors compare by dtype, shape and element data

use std::collections::HashMap;
use std::sync::Arc;

use crate::scalar::Scalar;
use crate::tensor::TensorView;

/// A value in the host runtime's object model.
#[derive(Debug, Clone)]
pub enum HostValue {
    /// Absent / null
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit IEEE-754 float
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes (distinct from String)
    Bytes(Vec<u8>),
    /// Ordered sequence
    Array(Vec<HostValue>),
    /// String-keyed map
    Object(HashMap<String, HostValue>),
    /// Tensor handle, shared with the host
    Tensor(Arc<TensorView>),
    /// Explicit scalar wrapper
    Scalar(Scalar),
}

impl HostValue {
    /// Kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "Null",
            HostValue::Bool(_) => "Bool",
            HostValue::Int(_) => "Int",
            HostValue::Float(_) => "Float",
            HostValue::String(_) => "String",
            HostValue::Bytes(_) => "Bytes",
            HostValue::Array(_) => "Array",
            HostValue::Object(_) => "Object",
            HostValue::Tensor(_) => "Tensor",
            HostValue::Scalar(_) => "Scalar",
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HostValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric view of Int, Float and numeric Scalar values
    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Int(i) => Some(*i as f64),
            HostValue::Float(f) => Some(*f),
            HostValue::Scalar(Scalar::Int(i)) => Some(*i as f64),
            HostValue::Scalar(Scalar::Double(d)) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes slice
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HostValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as array slice
    pub fn as_array(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get as object reference
    pub fn as_object(&self) -> Option<&HashMap<String, HostValue>> {
        match self {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Try to get the tensor handle
    pub fn as_tensor(&self) -> Option<&Arc<TensorView>> {
        match self {
            HostValue::Tensor(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Int(a), HostValue::Int(b)) => a == b,
            (HostValue::Float(a), HostValue::Float(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Bytes(a), HostValue::Bytes(b)) => a == b,
            (HostValue::Array(a), HostValue::Array(b)) => a == b,
            (HostValue::Object(a), HostValue::Object(b)) => a == b,
            (HostValue::Tensor(a), HostValue::Tensor(b)) => Arc::ptr_eq(a, b) || a == b,
            (HostValue::Scalar(a), HostValue::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Int(i)
    }
}

impl From<i32> for HostValue {
    fn from(i: i32) -> Self {
        HostValue::Int(i64::from(i))
    }
}

impl From<f64> for HostValue {
    fn from(f: f64) -> Self {
        HostValue::Float(f)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(a: Vec<HostValue>) -> Self {
        HostValue::Array(a)
    }
}

impl From<TensorView> for HostValue {
    fn from(t: TensorView) -> Self {
        HostValue::Tensor(Arc::new(t))
    }
}

impl From<Arc<TensorView>> for HostValue {
    fn from(t: Arc<TensorView>) -> Self {
        HostValue::Tensor(t)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(HostValue::Null)
    }
}
