//! Tagged value to host value conversion

use std::sync::Arc;

use tensorbridge_core::{Error, HostValue, Result, TaggedValue, TensorView};

/// Convert an engine value into a host value.
///
/// Total over every known tag; values with an unrecognized tag fail with
/// `UnsupportedTag`. Tensors are shared as-is; detach engine-owned storage
/// with [`TaggedValue::detach`] first.
pub fn from_tagged(value: &TaggedValue) -> Result<HostValue> {
    Ok(match value {
        TaggedValue::None => HostValue::Null,
        TaggedValue::Bool(b) => HostValue::Bool(*b),
        TaggedValue::Int(i) => HostValue::Int(*i),
        TaggedValue::Double(d) => HostValue::Float(*d),
        TaggedValue::String(s) => HostValue::String(s.clone()),
        TaggedValue::Tensor(t) => HostValue::Tensor(Arc::clone(t)),
        TaggedValue::ListBool(items) => {
            HostValue::Array(items.iter().map(|b| HostValue::Bool(*b)).collect())
        }
        TaggedValue::ListInt(items) => {
            HostValue::Array(items.iter().map(|i| HostValue::Int(*i)).collect())
        }
        TaggedValue::ListDouble(items) => {
            HostValue::Array(items.iter().map(|d| HostValue::Float(*d)).collect())
        }
        TaggedValue::ListTensor(items) => HostValue::Array(items.iter().map(tensor).collect()),
        TaggedValue::ListOptionalTensor(items) => HostValue::Array(
            items
                .iter()
                .map(|t| t.as_ref().map_or(HostValue::Null, tensor))
                .collect(),
        ),
        TaggedValue::Unrecognized { code } => {
            return Err(Error::UnsupportedTag {
                tag: format!("code {}", code),
            })
        }
    })
}

/// Convert an optional engine value; an empty optional becomes `Null`.
pub fn from_optional(value: Option<&TaggedValue>) -> Result<HostValue> {
    value.map_or(Ok(HostValue::Null), from_tagged)
}

/// Convert a result list, failing on the first unsupported value.
pub fn from_tagged_list(values: &[TaggedValue]) -> Result<Vec<HostValue>> {
    values.iter().map(from_tagged).collect()
}

fn tensor(t: &Arc<TensorView>) -> HostValue {
    HostValue::Tensor(Arc::clone(t))
}
