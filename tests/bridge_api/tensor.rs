//! Tensor Tests
//!
//! Construction, layout derivation and host conversions of `Tensor`.

use crate::*;
use proptest::prelude::*;
use tensorbridge::{element_size, Error, Ownership, Tensor, TensorInit, TypedVec};

fn row(values: &[f64]) -> HostValue {
    HostValue::Array(values.iter().map(|v| HostValue::Float(*v)).collect())
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_two_by_two_float() {
    let t = Tensor::new(
        TensorInit::values(vec![1.0, 2.0, 3.0, 4.0])
            .dtype(ScalarType::Float)
            .shape(vec![2, 2]),
    )
    .unwrap();

    assert_eq!(t.byte_size(), 16);
    assert_eq!(
        t.to_nested_array(),
        HostValue::Array(vec![row(&[1.0, 2.0]), row(&[3.0, 4.0])])
    );
    let err = t.item().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_nested_row_inference() {
    let t = Tensor::new(TensorInit::nested(HostValue::Array(vec![row(&[1.0, 2.0, 3.0])]))).unwrap();
    assert_eq!(t.dtype(), ScalarType::Float);
    assert_eq!(t.shape(), &[1, 3]);
    assert_eq!(t.strides(), &[3, 1]);
    assert_eq!(t.dim_order(), &[0, 1]);
}

#[test]
fn test_bool_scalar() {
    let t = Tensor::new(TensorInit::nested(true)).unwrap();
    assert_eq!(t.dtype(), ScalarType::Bool);
    assert_eq!(t.ndim(), 0);
    assert_eq!(t.item().unwrap(), HostValue::Bool(true));
}

#[test]
fn test_bfloat16_forty_two() {
    let t = Tensor::new(TensorInit::nested(42.0).dtype(ScalarType::BFloat16)).unwrap();
    assert_eq!(t.data(), &0x4228u16.to_ne_bytes());
    assert_eq!(t.item().unwrap(), HostValue::Float(42.0));
}

#[test]
fn test_mixed_ints_and_floats_infer_float() {
    let nested = HostValue::Array(vec![HostValue::Int(1), HostValue::Float(2.5)]);
    let t = Tensor::new(TensorInit::nested(nested)).unwrap();
    assert_eq!(t.dtype(), ScalarType::Float);
    assert_eq!(t.to_typed_vec().unwrap(), TypedVec::F32(vec![1.0, 2.5]));
}

#[test]
fn test_ragged_and_empty_rejected() {
    let ragged = HostValue::Array(vec![row(&[1.0]), row(&[1.0, 2.0])]);
    assert!(Tensor::new(TensorInit::nested(ragged)).unwrap_err().is_argument_error());

    let empty_inner = HostValue::Array(vec![HostValue::Array(vec![])]);
    assert!(Tensor::new(TensorInit::nested(empty_inner)).unwrap_err().is_argument_error());
}

// =============================================================================
// BUFFERS
// =============================================================================

#[test]
fn test_borrowed_buffer_shares_memory() {
    let host = Arc::new(vec![0u8; 16]);
    let t = Tensor::new(TensorInit::buffer(
        TypedBuffer::borrowed(Arc::clone(&host)),
        ScalarType::Float,
        vec![4],
    ))
    .unwrap();
    assert_eq!(t.ownership(), Ownership::Borrowed);
    assert_eq!(t.data().as_ptr(), host.as_ptr());
}

#[test]
fn test_explicit_strides_keep_layout() {
    let t = Tensor::new(
        TensorInit::values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .shape(vec![2, 3])
            .strides(vec![1, 2]),
    )
    .unwrap();
    assert_eq!(t.dim_order(), &[1, 0]);
    assert_eq!(t.to_typed_vec().unwrap(), TypedVec::F32(vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]));
}

#[test]
fn test_bad_dim_order_rejected() {
    let err = Tensor::new(
        TensorInit::values(vec![1.0, 2.0])
            .shape(vec![1, 2])
            .dim_order(vec![0, 0]),
    )
    .unwrap_err();
    assert!(err.is_argument_error());
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn dtype_strategy() -> impl Strategy<Value = ScalarType> {
    prop::sample::select(ScalarType::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_default_layout_is_row_major(
        dtype in dtype_strategy(),
        shape in prop::collection::vec(1usize..5, 0..4),
    ) {
        let n: usize = shape.iter().product();
        let t = Tensor::new(
            TensorInit::values(vec![0.0; n]).dtype(dtype).shape(shape.clone()),
        ).unwrap();

        let identity: Vec<usize> = (0..shape.len()).collect();
        prop_assert_eq!(t.dim_order(), identity.as_slice());

        let mut expected = vec![1usize; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            expected[i] = expected[i + 1] * shape[i + 1];
        }
        prop_assert_eq!(t.strides(), expected.as_slice());
    }

    #[test]
    fn prop_byte_size_and_item(
        dtype in dtype_strategy(),
        shape in prop::collection::vec(0usize..4, 0..3),
    ) {
        let n: usize = shape.iter().product();
        let t = Tensor::new(
            TensorInit::values(vec![1.0; n]).dtype(dtype).shape(shape),
        ).unwrap();
        prop_assert_eq!(t.byte_size(), n * element_size(dtype));
        prop_assert_eq!(t.item().is_ok(), n == 1);
    }
}
