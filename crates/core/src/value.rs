//! Engine-side tagged values
//!
//! The engine passes method arguments and results as a tagged union. `Tag`
//! is the discriminant with the engine's stable numeric codes; `TaggedValue`
//! carries the payload.
//!
//! ## Tags
//!
//! | Tag | Code | Payload |
//! |-----|------|---------|
//! | None | 0 | - |
//! | Tensor | 1 | tensor |
//! | String | 2 | UTF-8 string |
//! | Double | 3 | f64 |
//! | Int | 4 | i64 |
//! | Bool | 5 | bool |
//! | ListBool | 6 | bools |
//! | ListDouble | 7 | f64s |
//! | ListInt | 8 | i64s |
//! | ListTensor | 9 | tensors |
//! | ListScalar | 10 | not marshaled |
//! | ListOptionalTensor | 11 | optional tensors |

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tensor::TensorView;

/// Discriminant of a [`TaggedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Tag {
    /// No value
    None = 0,
    /// Tensor
    Tensor = 1,
    /// String
    String = 2,
    /// 64-bit float
    Double = 3,
    /// 64-bit integer
    Int = 4,
    /// Boolean
    Bool = 5,
    /// List of booleans
    ListBool = 6,
    /// List of floats
    ListDouble = 7,
    /// List of integers
    ListInt = 8,
    /// List of tensors
    ListTensor = 9,
    /// List of scalars
    ListScalar = 10,
    /// List of optional tensors
    ListOptionalTensor = 11,
}

impl Tag {
    /// Every tag, in code order.
    pub const ALL: [Tag; 12] = [
        Tag::None,
        Tag::Tensor,
        Tag::String,
        Tag::Double,
        Tag::Int,
        Tag::Bool,
        Tag::ListBool,
        Tag::ListDouble,
        Tag::ListInt,
        Tag::ListTensor,
        Tag::ListScalar,
        Tag::ListOptionalTensor,
    ];

    /// The engine's numeric code for this tag
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Resolve an engine code; `None` for codes this layer does not know.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Constant name as exposed to the host
    pub fn name(self) -> &'static str {
        match self {
            Tag::None => "None",
            Tag::Tensor => "Tensor",
            Tag::String => "String",
            Tag::Double => "Double",
            Tag::Int => "Int",
            Tag::Bool => "Bool",
            Tag::ListBool => "ListBool",
            Tag::ListDouble => "ListDouble",
            Tag::ListInt => "ListInt",
            Tag::ListTensor => "ListTensor",
            Tag::ListScalar => "ListScalar",
            Tag::ListOptionalTensor => "ListOptionalTensor",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A value in the engine's tagged representation.
///
/// Tensors are shared, not copied, on the way in. Engine results should be
/// detached with [`TensorView::from_engine_result`] before they outlive the
/// call that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// No value
    None,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Double(f64),
    /// String
    String(String),
    /// Tensor
    Tensor(Arc<TensorView>),
    /// List of booleans
    ListBool(Vec<bool>),
    /// List of integers
    ListInt(Vec<i64>),
    /// List of floats
    ListDouble(Vec<f64>),
    /// List of tensors
    ListTensor(Vec<Arc<TensorView>>),
    /// List of optional tensors
    ListOptionalTensor(Vec<Option<Arc<TensorView>>>),
    /// An engine value whose tag this layer cannot decode
    Unrecognized {
        /// Raw tag code
        code: i32,
    },
}

impl TaggedValue {
    /// Tag of this value, or `None` for an unrecognized code
    pub fn tag(&self) -> Option<Tag> {
        Some(match self {
            TaggedValue::None => Tag::None,
            TaggedValue::Bool(_) => Tag::Bool,
            TaggedValue::Int(_) => Tag::Int,
            TaggedValue::Double(_) => Tag::Double,
            TaggedValue::String(_) => Tag::String,
            TaggedValue::Tensor(_) => Tag::Tensor,
            TaggedValue::ListBool(_) => Tag::ListBool,
            TaggedValue::ListInt(_) => Tag::ListInt,
            TaggedValue::ListDouble(_) => Tag::ListDouble,
            TaggedValue::ListTensor(_) => Tag::ListTensor,
            TaggedValue::ListOptionalTensor(_) => Tag::ListOptionalTensor,
            TaggedValue::Unrecognized { code } => return Tag::from_code(*code),
        })
    }

    /// Raw tag code, including unrecognized ones
    pub fn tag_code(&self) -> i32 {
        match self {
            TaggedValue::Unrecognized { code } => *code,
            other => other.tag().map(Tag::code).unwrap_or(-1),
        }
    }

    /// Try to get the tensor payload
    pub fn as_tensor(&self) -> Option<&Arc<TensorView>> {
        match self {
            TaggedValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Replace every tensor payload with an owned deep copy.
    pub fn detach(&self) -> TaggedValue {
        let copy = |t: &Arc<TensorView>| Arc::new(TensorView::from_engine_result(t));
        match self {
            TaggedValue::Tensor(t) => TaggedValue::Tensor(copy(t)),
            TaggedValue::ListTensor(ts) => TaggedValue::ListTensor(ts.iter().map(copy).collect()),
            TaggedValue::ListOptionalTensor(ts) => {
                TaggedValue::ListOptionalTensor(ts.iter().map(|t| t.as_ref().map(copy)).collect())
            }
            other => other.clone(),
        }
    }
}
