//! Multi-dimensional tensor view over a typed buffer
//!
//! A `TensorView` is self-describing: dtype, shape, dim-order and strides
//! travel with the buffer so a view can cross the engine boundary without
//! any side channel.
//!
//! ## Layout Derivation
//!
//! | Supplied | Derived |
//! |----------|---------|
//! | neither | dim-order = identity, strides from shape + dim-order |
//! | strides only | dim-order = dims sorted by descending stride |
//! | dim-order only | strides from shape + dim-order |
//! | both | lengths and permutation checked, both kept as given |
//!
//! When both are supplied the dim-order is not checked against the strides.
//! Element reads follow the strides, and the dim-order is reported as given.
//!
//! Strides are in elements, not bytes. The innermost dimension of the
//! dim-order gets stride 1, each outer dimension gets the stride of the next
//! inner one multiplied by that dimension's size (zero-sized dimensions do
//! not zero the strides outside them).

use crate::buffer::{Ownership, TypedBuffer};
use crate::dtype::ScalarType;
use crate::error::{Error, Result};
use crate::host::HostValue;
use crate::scalar::Scalar;

/// A tensor: dtype, shape, dim-order and strides over a [`TypedBuffer`].
#[derive(Debug, Clone)]
pub struct TensorView {
    dtype: ScalarType,
    shape: Vec<usize>,
    dim_order: Vec<usize>,
    strides: Vec<usize>,
    buffer: TypedBuffer,
}

impl TensorView {
    /// Build a view over an existing buffer.
    ///
    /// Fails with `InvalidArgument` if the shape, dim-order and strides
    /// lengths disagree, if the dim-order is not a permutation, or if the
    /// buffer is smaller than the bytes the layout addresses.
    pub fn new(
        buffer: TypedBuffer,
        dtype: ScalarType,
        shape: Vec<usize>,
        dim_order: Option<Vec<usize>>,
        strides: Option<Vec<usize>>,
    ) -> Result<Self> {
        let ndim = shape.len();

        if let Some(order) = &dim_order {
            if order.len() != ndim {
                return Err(Error::InvalidArgument(format!(
                    "dim order has {} entries but shape has {} dimensions",
                    order.len(),
                    ndim
                )));
            }
            if !is_permutation(order) {
                return Err(Error::InvalidArgument(format!(
                    "dim order {:?} is not a permutation of 0..{}",
                    order, ndim
                )));
            }
        }
        if let Some(strides) = &strides {
            if strides.len() != ndim {
                return Err(Error::InvalidArgument(format!(
                    "strides have {} entries but shape has {} dimensions",
                    strides.len(),
                    ndim
                )));
            }
        }

        let dim_order = match dim_order {
            Some(order) => order,
            None => default_dim_order(ndim, strides.as_deref()),
        };
        let strides = match strides {
            Some(strides) => strides,
            None => dim_order_to_strides(&shape, &dim_order),
        };

        let view = Self {
            dtype,
            shape,
            dim_order,
            strides,
            buffer,
        };

        let required = view.required_bytes()?;
        if view.buffer.len() < required {
            return Err(Error::InvalidArgument(format!(
                "buffer holds {} bytes but the tensor needs {}",
                view.buffer.len(),
                required
            )));
        }
        Ok(view)
    }

    /// Build an owned tensor from a numeric list.
    ///
    /// Each value is cast to `dtype` and packed in storage order into a new
    /// owned buffer.
    pub fn from_values(
        values: &[f64],
        dtype: ScalarType,
        shape: Vec<usize>,
        dim_order: Option<Vec<usize>>,
        strides: Option<Vec<usize>>,
    ) -> Result<Self> {
        let item = dtype.element_size();
        let mut bytes = vec![0u8; values.len() * item];
        for (value, chunk) in values.iter().zip(bytes.chunks_exact_mut(item)) {
            dtype.encode_f64(*value, chunk);
        }
        Self::new(TypedBuffer::owned(bytes), dtype, shape, dim_order, strides)
    }

    /// Materialize an owned deep copy of an engine-produced tensor.
    ///
    /// Engine result storage is only valid for the duration of the call, so
    /// data, shape, dim-order and strides are all copied out here.
    pub fn from_engine_result(result: &TensorView) -> Self {
        // required_bytes cannot fail on a view that passed `new`
        let len = result
            .required_bytes()
            .unwrap_or(result.buffer.len())
            .min(result.buffer.len());
        Self {
            dtype: result.dtype,
            shape: result.shape.clone(),
            dim_order: result.dim_order.clone(),
            strides: result.strides.clone(),
            buffer: TypedBuffer::copy_from_slice(&result.buffer.as_bytes()[..len]),
        }
    }

    /// Element kind
    pub fn dtype(&self) -> ScalarType {
        self.dtype
    }

    /// Dimension sizes
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Physical-to-logical dimension order
    pub fn dim_order(&self) -> &[usize] {
        &self.dim_order
    }

    /// Per-dimension stride in elements
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of dimensions
    pub fn dim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements (1 for a 0-d tensor)
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// `numel * element_size`
    pub fn nbytes(&self) -> usize {
        self.numel() * self.element_size()
    }

    /// Size of one element in bytes
    pub fn element_size(&self) -> usize {
        self.dtype.element_size()
    }

    /// Backing buffer
    pub fn buffer(&self) -> &TypedBuffer {
        &self.buffer
    }

    /// Ownership mode of the backing buffer
    pub fn ownership(&self) -> Ownership {
        self.buffer.ownership()
    }

    /// Raw bytes of the backing buffer
    pub fn data(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Read the element at a logical index.
    pub fn element_at(&self, index: &[usize]) -> Result<Scalar> {
        if index.len() != self.dim() {
            return Err(Error::InvalidArgument(format!(
                "index has {} components but tensor has {} dimensions",
                index.len(),
                self.dim()
            )));
        }
        let mut offset = 0usize;
        for (d, (&i, &size)) in index.iter().zip(&self.shape).enumerate() {
            if i >= size {
                return Err(Error::InvalidArgument(format!(
                    "index {} out of range for dimension {} of size {}",
                    i, d, size
                )));
            }
            offset += i * self.strides[d];
        }
        Ok(self.read(offset))
    }

    /// Extract the single element of a one-element tensor.
    ///
    /// Fails with `InvalidArgument` unless the element count is exactly 1.
    pub fn item(&self) -> Result<Scalar> {
        if self.numel() != 1 {
            return Err(Error::InvalidArgument(format!(
                "item() requires a tensor with exactly one element, this one has {}",
                self.numel()
            )));
        }
        Ok(self.read(0))
    }

    /// Convert to nested host arrays in logical dimension order.
    ///
    /// A 0-d tensor converts to its single element.
    pub fn to_nested(&self) -> HostValue {
        if self.shape.is_empty() {
            return self.read(0).into();
        }
        self.nested_from(0, 0)
    }

    fn nested_from(&self, dim: usize, base: usize) -> HostValue {
        let size = self.shape[dim];
        let stride = self.strides[dim];
        let last = dim + 1 == self.dim();
        let items = (0..size)
            .map(|i| {
                let offset = base + i * stride;
                if last {
                    self.read(offset).into()
                } else {
                    self.nested_from(dim + 1, offset)
                }
            })
            .collect();
        HostValue::Array(items)
    }

    /// Elements in logical row-major order, as numbers
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.logical_offsets()
            .into_iter()
            .map(|offset| self.read(offset).to_f64())
            .collect()
    }

    /// Element bytes repacked in logical row-major order
    pub fn to_contiguous_bytes(&self) -> Vec<u8> {
        let item = self.element_size();
        let data = self.buffer.as_bytes();
        let offsets = self.logical_offsets();
        let mut out = Vec::with_capacity(offsets.len() * item);
        for offset in offsets {
            out.extend_from_slice(&data[offset * item..(offset + 1) * item]);
        }
        out
    }

    /// Element offsets (in elements) of every logical index, row-major.
    fn logical_offsets(&self) -> Vec<usize> {
        let numel = self.numel();
        let mut offsets = Vec::with_capacity(numel);
        if numel == 0 {
            return offsets;
        }
        let mut index = vec![0usize; self.dim()];
        for _ in 0..numel {
            offsets.push(
                index
                    .iter()
                    .zip(&self.strides)
                    .map(|(i, s)| i * s)
                    .sum(),
            );
            // odometer increment, last dimension fastest
            for d in (0..index.len()).rev() {
                index[d] += 1;
                if index[d] < self.shape[d] {
                    break;
                }
                index[d] = 0;
            }
        }
        offsets
    }

    fn read(&self, offset: usize) -> Scalar {
        let item = self.element_size();
        let start = offset * item;
        self.dtype
            .decode(&self.buffer.as_bytes()[start..start + item])
    }

    /// Bytes the layout addresses: at least `nbytes`, and enough to reach the
    /// farthest strided element.
    fn required_bytes(&self) -> Result<usize> {
        let too_large = || Error::InvalidArgument(format!("shape {:?} is too large", self.shape));
        let numel = self
            .shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(too_large)?;
        if numel == 0 {
            return Ok(0);
        }
        let item = self.element_size();
        let nbytes = numel.checked_mul(item).ok_or_else(too_large)?;
        let mut last = 0usize;
        for (&size, &stride) in self.shape.iter().zip(&self.strides) {
            last = (size - 1)
                .checked_mul(stride)
                .and_then(|v| v.checked_add(last))
                .ok_or_else(too_large)?;
        }
        let span = last
            .checked_add(1)
            .and_then(|v| v.checked_mul(item))
            .ok_or_else(too_large)?;
        Ok(nbytes.max(span))
    }
}

impl PartialEq for TensorView {
    /// Equal when dtype, shape and element-wise data match, regardless of
    /// physical layout or ownership.
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && self.shape == other.shape
            && self.to_contiguous_bytes() == other.to_contiguous_bytes()
    }
}

/// Number of elements for a shape (1 for the empty shape)
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Default dim-order: identity, or dimensions sorted by descending stride
/// when strides are known.
pub fn default_dim_order(ndim: usize, strides: Option<&[usize]>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ndim).collect();
    if let Some(strides) = strides {
        order.sort_by(|&a, &b| strides[b].cmp(&strides[a]));
    }
    order
}

/// Strides such that traversal follows `dim_order`.
pub fn dim_order_to_strides(shape: &[usize], dim_order: &[usize]) -> Vec<usize> {
    let ndim = shape.len();
    let mut strides = vec![0usize; ndim];
    if ndim == 0 {
        return strides;
    }
    strides[dim_order[ndim - 1]] = 1;
    for i in (0..ndim - 1).rev() {
        let inner = dim_order[i + 1];
        strides[dim_order[i]] = if shape[inner] == 0 {
            strides[inner]
        } else {
            shape[inner] * strides[inner]
        };
    }
    strides
}

fn is_permutation(order: &[usize]) -> bool {
    let mut seen = vec![false; order.len()];
    for &d in order {
        if d >= order.len() || seen[d] {
            return false;
        }
        seen[d] = true;
    }
    true
}
