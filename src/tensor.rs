//! Host-facing tensor
//!
//! [`Tensor`] is what a host constructs and reads. It wraps a shared
//! [`TensorView`] and adds input inference for nested host arrays.
//!
//! ## Construction
//!
//! | Data | dtype | shape |
//! |------|-------|-------|
//! | byte buffer | required | required |
//! | flat numbers | default Float | default `[len]` |
//! | nested host value | inferred: bool -> Bool, number -> Float | inferred from nesting |
//!
//! Byte buffers keep their ownership mode (a borrowed buffer is never
//! copied). Numeric input is always copied into an owned buffer.

use std::sync::Arc;

use tensorbridge_core::{
    Error, HostValue, Ownership, Result, Scalar, ScalarType, TensorView, TypedBuffer,
};
use tracing::trace;

/// Data source for a new tensor.
#[derive(Debug, Clone)]
pub enum TensorData {
    /// Raw element bytes, borrowed or owned
    Buffer(TypedBuffer),
    /// Flat numbers in storage order
    Values(Vec<f64>),
    /// A host scalar or nested host array of bools / numbers
    Nested(HostValue),
}

/// Everything needed to construct a [`Tensor`].
#[derive(Debug, Clone)]
pub struct TensorInit {
    /// Element data
    pub data: TensorData,
    /// Element kind
    pub dtype: Option<ScalarType>,
    /// Dimension sizes
    pub shape: Option<Vec<usize>>,
    /// Physical-to-logical dimension order
    pub dim_order: Option<Vec<usize>>,
    /// Per-dimension strides in elements
    pub strides: Option<Vec<usize>>,
}

impl TensorInit {
    /// Init from raw bytes. Buffers need an explicit dtype and shape.
    pub fn buffer(buffer: TypedBuffer, dtype: ScalarType, shape: Vec<usize>) -> Self {
        Self::from_data(TensorData::Buffer(buffer))
            .dtype(dtype)
            .shape(shape)
    }

    /// Init from flat numbers.
    pub fn values(values: Vec<f64>) -> Self {
        Self::from_data(TensorData::Values(values))
    }

    /// Init from a host scalar or nested host array.
    pub fn nested(value: impl Into<HostValue>) -> Self {
        Self::from_data(TensorData::Nested(value.into()))
    }

    fn from_data(data: TensorData) -> Self {
        Self {
            data,
            dtype: None,
            shape: None,
            dim_order: None,
            strides: None,
        }
    }

    /// Set the dtype.
    pub fn dtype(mut self, dtype: ScalarType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Set the shape.
    pub fn shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the dim-order.
    pub fn dim_order(mut self, dim_order: Vec<usize>) -> Self {
        self.dim_order = Some(dim_order);
        self
    }

    /// Set the strides.
    pub fn strides(mut self, strides: Vec<usize>) -> Self {
        self.strides = Some(strides);
        self
    }
}

/// Elements copied out into a native vector.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedVec {
    /// Byte elements
    U8(Vec<u8>),
    /// Char elements
    I8(Vec<i8>),
    /// Short elements
    I16(Vec<i16>),
    /// Int elements
    I32(Vec<i32>),
    /// Long elements
    I64(Vec<i64>),
    /// UInt16 elements
    U16(Vec<u16>),
    /// UInt32 elements
    U32(Vec<u32>),
    /// UInt64 elements
    U64(Vec<u64>),
    /// Float elements
    F32(Vec<f32>),
    /// Double elements
    F64(Vec<f64>),
    /// Bool elements
    Bool(Vec<bool>),
}

/// A tensor as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    view: Arc<TensorView>,
}

impl Tensor {
    /// Construct a tensor.
    ///
    /// Fails with `InvalidArgument` for a buffer without dtype or shape,
    /// empty or ragged nested arrays, non-numeric leaves, fewer values than
    /// the shape needs, or an inconsistent layout.
    pub fn new(init: TensorInit) -> Result<Self> {
        let TensorInit {
            data,
            dtype,
            shape,
            dim_order,
            strides,
        } = init;

        let view = match data {
            TensorData::Buffer(buffer) => {
                let (Some(dtype), Some(shape)) = (dtype, shape) else {
                    return Err(Error::InvalidArgument(
                        "dtype and shape are required when data is a buffer".to_string(),
                    ));
                };
                TensorView::new(buffer, dtype, shape, dim_order, strides)?
            }
            TensorData::Values(values) => {
                let shape = shape.unwrap_or_else(|| vec![values.len()]);
                check_enough(values.len(), &shape)?;
                TensorView::from_values(
                    &values,
                    dtype.unwrap_or(ScalarType::Float),
                    shape,
                    dim_order,
                    strides,
                )?
            }
            TensorData::Nested(value) => {
                let dtype = match dtype {
                    Some(dtype) => dtype,
                    None => infer_dtype(&value)?,
                };
                let shape = match shape {
                    Some(shape) => shape,
                    None => infer_shape(&value)?,
                };
                let mut flat = Vec::new();
                flatten(&value, &mut flat)?;
                check_enough(flat.len(), &shape)?;
                TensorView::from_values(&flat, dtype, shape, dim_order, strides)?
            }
        };

        trace!(dtype = %view.dtype(), shape = ?view.shape(), "Tensor created");
        Ok(Self {
            view: Arc::new(view),
        })
    }

    /// Wrap an existing view.
    pub fn from_view(view: impl Into<Arc<TensorView>>) -> Self {
        Self { view: view.into() }
    }

    /// The underlying view
    pub fn view(&self) -> &Arc<TensorView> {
        &self.view
    }

    /// Raw element bytes
    pub fn data(&self) -> &[u8] {
        self.view.data()
    }

    /// Element kind
    pub fn dtype(&self) -> ScalarType {
        self.view.dtype()
    }

    /// Dimension sizes
    pub fn shape(&self) -> &[usize] {
        self.view.shape()
    }

    /// Physical-to-logical dimension order
    pub fn dim_order(&self) -> &[usize] {
        self.view.dim_order()
    }

    /// Per-dimension strides in elements
    pub fn strides(&self) -> &[usize] {
        self.view.strides()
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.view.dim()
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.view.numel()
    }

    /// Size of the element data in bytes
    pub fn byte_size(&self) -> usize {
        self.view.nbytes()
    }

    /// Size of one element in bytes
    pub fn item_size(&self) -> usize {
        self.view.element_size()
    }

    /// Ownership of the backing buffer
    pub fn ownership(&self) -> Ownership {
        self.view.ownership()
    }

    /// The single element of a one-element tensor.
    pub fn item(&self) -> Result<HostValue> {
        self.view.item().map(HostValue::from)
    }

    /// Nested host arrays in logical order.
    pub fn to_nested_array(&self) -> HostValue {
        self.view.to_nested()
    }

    /// Copy the elements, in logical order, into a native vector.
    ///
    /// Half and BFloat16 have no native vector type and fail with
    /// `InvalidArgument`.
    pub fn to_typed_vec(&self) -> Result<TypedVec> {
        let bytes = self.view.to_contiguous_bytes();
        Ok(match self.dtype() {
            ScalarType::Byte => TypedVec::U8(bytes),
            ScalarType::Char => TypedVec::I8(bytes.iter().map(|b| *b as i8).collect()),
            ScalarType::Short => TypedVec::I16(chunks(&bytes, i16::from_ne_bytes)),
            ScalarType::Int => TypedVec::I32(chunks(&bytes, i32::from_ne_bytes)),
            ScalarType::Long => TypedVec::I64(chunks(&bytes, i64::from_ne_bytes)),
            ScalarType::UInt16 => TypedVec::U16(chunks(&bytes, u16::from_ne_bytes)),
            ScalarType::UInt32 => TypedVec::U32(chunks(&bytes, u32::from_ne_bytes)),
            ScalarType::UInt64 => TypedVec::U64(chunks(&bytes, u64::from_ne_bytes)),
            ScalarType::Float => TypedVec::F32(chunks(&bytes, f32::from_ne_bytes)),
            ScalarType::Double => TypedVec::F64(chunks(&bytes, f64::from_ne_bytes)),
            ScalarType::Bool => TypedVec::Bool(bytes.iter().map(|b| *b != 0).collect()),
            other @ (ScalarType::Half | ScalarType::BFloat16) => {
                return Err(Error::InvalidArgument(format!(
                    "no native vector type for dtype {}",
                    other
                )))
            }
        })
    }
}

impl From<Tensor> for HostValue {
    fn from(t: Tensor) -> Self {
        HostValue::Tensor(t.view)
    }
}

impl TryFrom<&HostValue> for Tensor {
    type Error = Error;

    fn try_from(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Tensor(view) => Ok(Tensor::from_view(Arc::clone(view))),
            other => Err(Error::InvalidArgument(format!(
                "expected Tensor, got {}",
                other.type_name()
            ))),
        }
    }
}

fn chunks<const N: usize, T>(bytes: &[u8], decode: fn([u8; N]) -> T) -> Vec<T> {
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut raw = [0u8; N];
            raw.copy_from_slice(chunk);
            decode(raw)
        })
        .collect()
}

fn check_enough(available: usize, shape: &[usize]) -> Result<()> {
    let needed = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| Error::InvalidArgument(format!("the shape {:?} is too large", shape)))?;
    if available < needed {
        return Err(Error::InvalidArgument(format!(
            "the input has less data ({} values) than the shape {:?} needs ({})",
            available, shape, needed
        )));
    }
    Ok(())
}

fn infer_dtype(value: &HostValue) -> Result<ScalarType> {
    match value {
        HostValue::Array(items) => match items.first() {
            Some(first) => infer_dtype(first),
            None => Err(Error::InvalidArgument(
                "can not contain empty array in input".to_string(),
            )),
        },
        HostValue::Bool(_) | HostValue::Scalar(Scalar::Bool(_)) => Ok(ScalarType::Bool),
        HostValue::Int(_) | HostValue::Float(_) | HostValue::Scalar(_) => Ok(ScalarType::Float),
        other => Err(unsupported(other)),
    }
}

fn infer_shape(value: &HostValue) -> Result<Vec<usize>> {
    let HostValue::Array(items) = value else {
        return Ok(Vec::new());
    };
    let Some(first) = items.first() else {
        return Err(Error::InvalidArgument(
            "can not contain empty array in input".to_string(),
        ));
    };
    let sub = infer_shape(first)?;
    for item in &items[1..] {
        if infer_shape(item)? != sub {
            return Err(Error::InvalidArgument(
                "sub-arrays should have the same length".to_string(),
            ));
        }
    }
    let mut shape = Vec::with_capacity(sub.len() + 1);
    shape.push(items.len());
    shape.extend(sub);
    Ok(shape)
}

fn flatten(value: &HostValue, out: &mut Vec<f64>) -> Result<()> {
    match value {
        HostValue::Array(items) => {
            for item in items {
                flatten(item, out)?;
            }
            Ok(())
        }
        HostValue::Bool(b) => {
            out.push(f64::from(u8::from(*b)));
            Ok(())
        }
        HostValue::Int(_) | HostValue::Float(_) | HostValue::Scalar(_) => {
            out.push(Scalar::from_host(value)?.to_f64());
            Ok(())
        }
        other => Err(unsupported(other)),
    }
}

fn unsupported(value: &HostValue) -> Error {
    Error::InvalidArgument(format!(
        "unsupported input: {}, expected Boolean or Number",
        value.type_name()
    ))
}
