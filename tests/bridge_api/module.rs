//! Module Tests
//!
//! Program loading, method metadata and validated invocation through the
//! typed `Module` handle.

use crate::*;
use std::io::Write;
use tensorbridge::{Error, Ownership, FORWARD};

fn forward_args() -> Vec<HostValue> {
    vec![float_tensor(&[1.0, 2.0, 3.0, 4.0], vec![2, 2]), HostValue::Int(7)]
}

// =============================================================================
// LOAD TESTS
// =============================================================================

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"PTE0 program bytes").unwrap();

    let (module, recorder) = module_for(ModelSource::file(file.path()));
    assert!(!module.is_loaded().unwrap());
    module.load().unwrap();
    assert!(module.is_loaded().unwrap());
    assert_eq!(recorder.programs(), vec![Verification::Minimal]);
}

#[test]
fn test_load_missing_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (module, recorder) = module_for(ModelSource::file(dir.path().join("missing.pte")));

    let err = module.load_async().wait().unwrap_err();
    assert!(err.is_engine_error());
    assert_eq!(err.engine_code(), Some(ErrorCode::NotFound));
    assert_eq!(err.code(), "NotFound");
    assert!(recorder.programs().is_empty());
}

#[test]
fn test_invalid_program() {
    let (module, _) = module_for(ModelSource::buffer(b"BAD!".to_vec()));
    let err = module.load().unwrap_err();
    assert_eq!(err.engine_code(), Some(ErrorCode::InvalidProgram));
    assert!(!module.is_loaded().unwrap());
}

#[test]
fn test_load_with_verification() {
    let (module, recorder) = module_for(ModelSource::buffer(b"PTE0".to_vec()));
    module.load_with(Verification::InternalConsistency).unwrap();
    assert_eq!(recorder.programs(), vec![Verification::InternalConsistency]);
}

// =============================================================================
// METHOD METADATA TESTS
// =============================================================================

#[test]
fn test_method_names_sorted() {
    let (module, _) = loaded_module();
    assert_eq!(
        module.method_names().unwrap(),
        vec!["forward".to_string(), "opaque".to_string(), "sleep".to_string()]
    );
}

#[test]
fn test_method_meta_exposed() {
    let (module, _) = loaded_module();
    let meta = module.method_meta(FORWARD).unwrap();
    assert_eq!(meta.num_inputs(), 2);
    assert_eq!(meta.input_tags(), &[Tag::Tensor, Tag::Int]);
    let info = meta.input_tensor_meta(0).unwrap().unwrap();
    assert_eq!(info.sizes, vec![2, 2]);
    assert_eq!(info.nbytes, 16);
    assert!(meta.input_tensor_meta(1).unwrap().is_none());
    assert!(meta.input_tag(5).is_err());
}

#[test]
fn test_method_meta_serializes() {
    let (module, _) = loaded_module();
    let meta = module.method_meta("sleep").unwrap();
    let json = serde_json::to_string(&meta).unwrap();
    let back: MethodMeta = serde_json::from_str(&json).unwrap();
    assert_eq!(back, meta);
}

#[test]
fn test_load_method() {
    let (module, _) = loaded_module();
    assert!(!module.is_method_loaded(FORWARD).unwrap());
    module.load_method(FORWARD).unwrap();
    assert!(module.is_method_loaded(FORWARD).unwrap());
    assert_eq!(
        module.load_method("nope").unwrap_err().engine_code(),
        Some(ErrorCode::NotFound)
    );
}

// =============================================================================
// INVOCATION TESTS
// =============================================================================

#[test]
fn test_forward_round_trip() {
    let (module, recorder) = loaded_module();
    let outputs = module.forward(forward_args()).unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0], forward_args()[0]);
    assert_eq!(outputs[1], HostValue::Int(7));
    assert_eq!(recorder.execute_calls(), 1);

    let args = recorder.last_args().unwrap();
    assert_eq!(args[0].tag(), Some(Tag::Tensor));
    assert_eq!(args[1], TaggedValue::Int(7));
}

#[test]
fn test_result_tensors_are_owned_copies() {
    let (module, _) = loaded_module();
    let outputs = module.forward(forward_args()).unwrap();
    let tensor = outputs[0].as_tensor().unwrap();
    assert_eq!(tensor.ownership(), Ownership::Owned);
    assert_eq!(tensor.to_f64_vec(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_missing_argument_never_reaches_engine() {
    let (module, recorder) = loaded_module();
    let err = module
        .forward(vec![float_tensor(&[1.0, 2.0, 3.0, 4.0], vec![2, 2])])
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(err.to_string().contains("expected 2, got 1"));
    assert_eq!(recorder.execute_calls(), 0);
    assert!(!module.is_method_loaded("forward").unwrap());
}

#[test]
fn test_wrong_type_names_argument() {
    let (module, recorder) = loaded_module();
    let err = module
        .forward(vec![HostValue::from("text"), HostValue::Int(1)])
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("argument 0"), "{}", message);
    assert!(message.contains("expected Tensor"), "{}", message);
    assert_eq!(recorder.execute_calls(), 0);
    assert!(!module.is_method_loaded("forward").unwrap());
}

#[test]
fn test_dtype_mismatch_rejected() {
    let (module, recorder) = loaded_module();
    let long = HostValue::from(
        TensorView::from_values(&[1.0, 2.0, 3.0, 4.0], ScalarType::Long, vec![2, 2], None, None)
            .unwrap(),
    );
    let err = module.forward(vec![long, HostValue::Int(1)]).unwrap_err();
    assert!(err.to_string().contains("expected dtype Float, got Long"));
    assert_eq!(recorder.execute_calls(), 0);
}

#[test]
fn test_float_for_int_slot_truncates() {
    let (module, recorder) = loaded_module();
    let outputs = module.execute("sleep", vec![HostValue::Float(1.9)]).unwrap();
    assert_eq!(outputs, vec![HostValue::Int(1)]);
    assert_eq!(recorder.last_args().unwrap(), vec![TaggedValue::Int(1)]);
}

#[test]
fn test_unknown_method() {
    let (module, recorder) = loaded_module();
    let err = module.execute("missing", vec![]).unwrap_err();
    assert_eq!(err.engine_code(), Some(ErrorCode::NotFound));
    assert_eq!(recorder.execute_calls(), 0);
}

#[test]
fn test_undecodable_output() {
    let (module, recorder) = loaded_module();
    let err = module.execute("opaque", vec![]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedTag { .. }));
    assert_eq!(recorder.execute_calls(), 1);
}
