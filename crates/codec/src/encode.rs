//! Host value to tagged value conversion

use std::sync::Arc;

use tensorbridge_core::{Error, HostValue, Result, Scalar, Tag, TaggedValue, TensorView};

/// Convert a host value into the representation `tag` declares.
///
/// Fails with `InvalidArgument` when the host value's kind cannot satisfy
/// the tag, and with `UnsupportedTag` for `ListScalar`.
pub fn to_tagged(value: &HostValue, tag: Tag) -> Result<TaggedValue> {
    match tag {
        Tag::None => match value {
            HostValue::Null => Ok(TaggedValue::None),
            other => Err(mismatch(tag, other)),
        },
        Tag::Tensor => to_tensor(value, tag).map(TaggedValue::Tensor),
        Tag::String => match value {
            HostValue::String(s) => Ok(TaggedValue::String(s.clone())),
            other => Err(mismatch(tag, other)),
        },
        Tag::Double => to_double(value, tag).map(TaggedValue::Double),
        Tag::Int => to_int(value, tag).map(TaggedValue::Int),
        Tag::Bool => to_bool(value, tag).map(TaggedValue::Bool),
        Tag::ListBool => list(value, tag, to_bool).map(TaggedValue::ListBool),
        Tag::ListDouble => list(value, tag, to_double).map(TaggedValue::ListDouble),
        Tag::ListInt => list(value, tag, to_int).map(TaggedValue::ListInt),
        Tag::ListTensor => list(value, tag, to_tensor).map(TaggedValue::ListTensor),
        Tag::ListOptionalTensor => list(value, tag, |item, tag| match item {
            HostValue::Null => Ok(None),
            other => to_tensor(other, tag).map(Some),
        })
        .map(TaggedValue::ListOptionalTensor),
        Tag::ListScalar => Err(Error::UnsupportedTag {
            tag: tag.name().to_string(),
        }),
    }
}

/// Convert an optional host value.
///
/// Absent and `Null` both map to an empty optional; anything else goes
/// through [`to_tagged`].
pub fn to_tagged_optional(value: Option<&HostValue>, tag: Tag) -> Result<Option<TaggedValue>> {
    match value {
        None | Some(HostValue::Null) => Ok(None),
        Some(v) => to_tagged(v, tag).map(Some),
    }
}

fn to_tensor(value: &HostValue, tag: Tag) -> Result<Arc<TensorView>> {
    match value {
        HostValue::Tensor(t) => Ok(Arc::clone(t)),
        other => Err(mismatch(tag, other)),
    }
}

fn to_double(value: &HostValue, tag: Tag) -> Result<f64> {
    match value {
        HostValue::Float(f) => Ok(*f),
        HostValue::Int(i) => Ok(*i as f64),
        HostValue::Scalar(Scalar::Double(d)) => Ok(*d),
        HostValue::Scalar(Scalar::Int(i)) => Ok(*i as f64),
        other => Err(mismatch(tag, other)),
    }
}

fn to_int(value: &HostValue, tag: Tag) -> Result<i64> {
    let float = match value {
        HostValue::Int(i) | HostValue::Scalar(Scalar::Int(i)) => return Ok(*i),
        HostValue::Float(f) | HostValue::Scalar(Scalar::Double(f)) => *f,
        other => return Err(mismatch(tag, other)),
    };
    if !float.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "expected {}, got non-finite number {}",
            tag, float
        )));
    }
    Ok(float as i64)
}

fn to_bool(value: &HostValue, tag: Tag) -> Result<bool> {
    match value {
        HostValue::Bool(b) | HostValue::Scalar(Scalar::Bool(b)) => Ok(*b),
        other => Err(mismatch(tag, other)),
    }
}

fn list<T>(
    value: &HostValue,
    tag: Tag,
    convert: impl Fn(&HostValue, Tag) -> Result<T>,
) -> Result<Vec<T>> {
    let items = match value {
        HostValue::Array(items) => items,
        other => return Err(mismatch(tag, other)),
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            convert(item, tag).map_err(|e| match e {
                Error::InvalidArgument(msg) => {
                    Error::InvalidArgument(format!("element {} of {}: {}", i, tag, msg))
                }
                other => other,
            })
        })
        .collect()
}

fn mismatch(tag: Tag, value: &HostValue) -> Error {
    Error::InvalidArgument(format!("expected {}, got {}", tag, value.type_name()))
}
