//! Host Error Tests
//!
//! Every failure reaches the host as a `HostError` whose kind tells the
//! caller's fault apart from the engine's and the bridge's.

use crate::*;
use tensorbridge::{ErrorKind, HostError};

#[test]
fn test_argument_error_kind() {
    let (module, _) = loaded_module();
    let err: HostError = module.forward(vec![HostValue::Int(1)]).unwrap_err().into();
    assert_eq!(err.kind, ErrorKind::ArgumentError);
    assert_eq!(err.code, "InvalidArgument");
    assert!(err.message.contains("expected 2, got 1"));
}

#[test]
fn test_missing_model_is_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let (module, _) = module_for(ModelSource::file(dir.path().join("gone.pte")));
    let err: HostError = module.load().unwrap_err().into();

    assert_eq!(err.kind, ErrorKind::EngineError);
    assert_eq!(err.code, "NotFound");
    let details = err.details.as_ref().and_then(HostValue::as_object).unwrap();
    assert_eq!(
        details["engineCode"],
        HostValue::Int(i64::from(ErrorCode::NotFound.raw()))
    );
}

#[test]
fn test_undecodable_output_is_unsupported_tag() {
    let (module, _) = loaded_module();
    let err: HostError = module.execute("opaque", vec![]).unwrap_err().into();
    assert_eq!(err.kind, ErrorKind::UnsupportedTagError);
    assert_eq!(err.to_string(), format!("UnsupportedTagError: {}", err.message));
}

#[test]
fn test_shutdown_bridge_is_bridge_error() {
    init_tracing();
    let bridge = test_bridge();
    let (engine, _) = RecordingEngine::new(vec![sleep_meta()]);
    let module = Module::builder(ModelSource::buffer(b"PTE0".to_vec()))
        .engine(Box::new(engine))
        .bridge(Arc::clone(&bridge))
        .build()
        .unwrap();
    bridge.shutdown();

    let err: HostError = module.load_async().wait().unwrap_err().into();
    assert_eq!(err.kind, ErrorKind::BridgeError);
    assert_eq!(err.code, "ShutDown");
    // the inline path does not need the bridge
    module.load().unwrap();
}

#[test]
fn test_host_value_export() {
    let (module, _) = loaded_module();
    let err: HostError = module.load_method("nope").unwrap_err().into();
    let exported = err.to_host_value();
    let obj = exported.as_object().unwrap();
    assert_eq!(obj["kind"], HostValue::from("EngineError"));
    assert_eq!(obj["code"], HostValue::from("NotFound"));
    assert!(obj.contains_key("details"));
}
