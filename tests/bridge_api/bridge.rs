//! Background Execution Tests
//!
//! The `_async` paths, the shared worker pool and abandonment of queued work.

use crate::*;
use std::sync::mpsc;
use std::time::Instant;
use tensorbridge::{BridgeError, Error, PendingState};

// =============================================================================
// ASYNC EXECUTION
// =============================================================================

#[test]
fn test_sleeping_units_all_resolve() {
    let (module, recorder) = loaded_module();
    let delays = [40i64, 5, 25, 10, 30, 15];

    let pending: Vec<_> = delays
        .iter()
        .map(|ms| module.execute_async("sleep", vec![HostValue::Int(*ms)]))
        .collect();

    for (ms, handle) in delays.iter().zip(pending) {
        assert_eq!(handle.wait().unwrap(), vec![HostValue::Int(*ms)]);
    }
    assert_eq!(recorder.execute_calls(), delays.len());
}

#[tokio::test]
async fn test_awaited_forward() {
    let (module, _) = module_for(ModelSource::buffer(b"PTE0".to_vec()));
    module.load_async().await.unwrap();

    let args = vec![float_tensor(&[1.0, 2.0, 3.0, 4.0], vec![2, 2]), HostValue::Int(3)];
    let outputs = module.forward_async(args.clone()).await.unwrap();
    assert_eq!(outputs, module.forward(args).unwrap());
}

#[tokio::test]
async fn test_awaited_rejection() {
    let (module, _) = loaded_module();
    let err = module.forward_async(vec![]).await.unwrap_err();
    assert!(err.is_argument_error());
}

#[test]
fn test_async_returns_before_work_finishes() {
    let (module, _) = loaded_module();
    let started = Instant::now();
    let mut handle = module.execute_async("sleep", vec![HostValue::Int(200)]);
    assert!(started.elapsed() < Duration::from_millis(150));
    assert!(handle.wait_timeout(Duration::from_millis(1)).is_none());
    assert!(!handle.state().is_terminal());
    assert_eq!(handle.wait().unwrap(), vec![HostValue::Int(200)]);
}

// =============================================================================
// SHARED BRIDGE
// =============================================================================

#[test]
fn test_modules_share_one_bridge() {
    init_tracing();
    let bridge = Arc::new(ExecutionBridge::with_config(BridgeConfig::new().num_workers(1)).unwrap());
    let modules: Vec<Module> = (0..3)
        .map(|_| {
            let (engine, _) = RecordingEngine::new(vec![sleep_meta()]);
            Module::builder(ModelSource::buffer(b"PTE0".to_vec()))
                .engine(Box::new(engine))
                .bridge(Arc::clone(&bridge))
                .build()
                .unwrap()
        })
        .collect();

    for m in &modules {
        m.load().unwrap();
    }
    let pending: Vec<_> = modules
        .iter()
        .enumerate()
        .map(|(i, m)| m.execute_async("sleep", vec![HostValue::Int(i as i64)]))
        .collect();
    for (i, p) in pending.into_iter().enumerate() {
        assert_eq!(p.wait().unwrap(), vec![HostValue::Int(i as i64)]);
    }
    assert_eq!(bridge.num_workers(), 1);
}

#[test]
fn test_bridge_config_from_json() {
    let config: BridgeConfig =
        serde_json::from_str(r#"{"num_workers": 3, "thread_name_prefix": "infer"}"#).unwrap();
    let bridge = ExecutionBridge::with_config(config).unwrap();
    assert_eq!(bridge.num_workers(), 3);
    assert_eq!(bridge.config().thread_name_prefix, "infer");
}

// =============================================================================
// ABANDONMENT
// =============================================================================

#[test]
fn test_queued_work_abandoned_at_shutdown() {
    let bridge = Arc::new(ExecutionBridge::with_config(BridgeConfig::new().num_workers(1)).unwrap());
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let running = bridge.submit(move || {
        started_tx.send(()).unwrap();
        release_rx.recv().unwrap();
        Ok(1)
    });
    started_rx.recv().unwrap();
    let queued = bridge.submit(|| Ok(2));
    assert_eq!(bridge.queued(), 1);

    let stopper = {
        let bridge = Arc::clone(&bridge);
        std::thread::spawn(move || bridge.shutdown())
    };

    let err = queued.wait().unwrap_err();
    assert!(matches!(err, Error::Bridge(BridgeError::Abandoned)));
    assert!(err.is_abandoned());

    release_tx.send(()).unwrap();
    stopper.join().unwrap();
    assert_eq!(running.wait().unwrap(), 1);
}

#[test]
fn test_dropped_completer_rejects() {
    let (completer, pending) = tensorbridge::concurrency::channel::<u8>();
    completer.mark_running();
    assert_eq!(pending.state(), PendingState::Running);

    drop(completer);
    assert_eq!(pending.state(), PendingState::Rejected);
    assert!(pending.wait().unwrap_err().is_abandoned());
}

#[test]
fn test_submit_after_shutdown() {
    let bridge = ExecutionBridge::with_config(BridgeConfig::new().num_workers(1)).unwrap();
    bridge.shutdown();
    let err = bridge.submit(|| Ok(())).wait().unwrap_err();
    assert!(matches!(err, Error::Bridge(BridgeError::ShutDown)));
}

#[test]
fn test_panicking_unit_rejects_and_worker_survives() {
    let bridge = ExecutionBridge::with_config(BridgeConfig::new().num_workers(1)).unwrap();
    let err = bridge
        .submit::<(), _>(|| panic!("kernel exploded"))
        .wait()
        .unwrap_err();
    match err {
        Error::Bridge(BridgeError::Panicked(message)) => assert!(message.contains("kernel exploded")),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(bridge.submit(|| Ok(5)).wait().unwrap(), 5);
}
