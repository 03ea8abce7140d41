//! Bridge API Test Suite
//!
//! End-to-end checks of the host-facing surface: tensors, the typed module
//! handle, background execution and the errors a host sees. The engine is a
//! recording double so tests can assert what did (and did not) reach it.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test bridge_api
//!
//! # Run module tests only
//! cargo test --test bridge_api module::
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tensorbridge::{
    BridgeConfig, Engine, EngineError, EngineResult, ErrorCode, ExecutionBridge, HostValue,
    MethodMeta, ModelSource, Module, ProgramData, ScalarType, Tag, TaggedValue, TensorInfo,
    TensorView, TypedBuffer, Verification,
};

// Test modules
pub mod bridge;
pub mod errors;
pub mod module;
pub mod sampling;
pub mod tensor;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a test-writer subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// What the recording engine saw. Shared between the engine and the test.
#[derive(Default)]
pub struct Recorder {
    execute_calls: AtomicUsize,
    programs: Mutex<Vec<Verification>>,
    executed: Mutex<Vec<(String, Vec<TaggedValue>)>>,
}

impl Recorder {
    /// Number of `execute_method` calls
    pub fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    /// Verification mode of every program load, in order
    pub fn programs(&self) -> Vec<Verification> {
        self.programs.lock().clone()
    }

    /// Arguments of the most recent execution
    pub fn last_args(&self) -> Option<Vec<TaggedValue>> {
        self.executed.lock().last().map(|(_, args)| args.clone())
    }
}

/// Engine double.
///
/// - Tensor outputs echo the first tensor argument through a borrowed arena
/// - Int outputs return the first Int argument; `sleep` sleeps that many ms
/// - ListScalar outputs come back with a tag this layer cannot decode
pub struct RecordingEngine {
    methods: HashMap<String, MethodMeta>,
    loaded: bool,
    recorder: Arc<Recorder>,
}

impl RecordingEngine {
    /// Engine exposing `methods`, plus the recorder it writes to.
    pub fn new(methods: Vec<MethodMeta>) -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let engine = Self {
            methods: methods
                .into_iter()
                .map(|m| (m.name().to_string(), m))
                .collect(),
            loaded: false,
            recorder: Arc::clone(&recorder),
        };
        (engine, recorder)
    }

    fn lookup(&self, name: &str) -> EngineResult<&MethodMeta> {
        if !self.loaded {
            return Err(EngineError::new(ErrorCode::InvalidState, "no program"));
        }
        self.methods.get(name).ok_or_else(|| {
            EngineError::new(ErrorCode::NotFound, format!("method '{}' not found", name))
        })
    }
}

impl Engine for RecordingEngine {
    fn load_program(&mut self, program: &ProgramData, verification: Verification) -> EngineResult<()> {
        if program.bytes().starts_with(b"BAD") {
            return Err(EngineError::from_code(ErrorCode::InvalidProgram));
        }
        self.recorder.programs.lock().push(verification);
        self.loaded = true;
        Ok(())
    }

    fn method_names(&self) -> EngineResult<Vec<String>> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn load_method(&mut self, name: &str) -> EngineResult<()> {
        self.lookup(name).map(|_| ())
    }

    fn method_meta(&self, name: &str) -> EngineResult<MethodMeta> {
        self.lookup(name).cloned()
    }

    fn execute_method(&self, name: &str, args: &[TaggedValue]) -> EngineResult<Vec<TaggedValue>> {
        let meta = self.lookup(name)?;
        self.recorder.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.recorder
            .executed
            .lock()
            .push((name.to_string(), args.to_vec()));

        let first_int = args.iter().find_map(|a| match a {
            TaggedValue::Int(i) => Some(*i),
            _ => None,
        });
        if name == "sleep" {
            std::thread::sleep(Duration::from_millis(first_int.unwrap_or(0) as u64));
        }

        meta.output_tags()
            .iter()
            .map(|tag| {
                Ok(match tag {
                    Tag::Tensor => {
                        let source = args.iter().find_map(TaggedValue::as_tensor).ok_or_else(|| {
                            EngineError::new(ErrorCode::InvalidArgument, "no tensor to echo")
                        })?;
                        let arena = Arc::new(source.to_contiguous_bytes());
                        let view = TensorView::new(
                            TypedBuffer::borrowed(arena),
                            source.dtype(),
                            source.shape().to_vec(),
                            None,
                            None,
                        )
                        .map_err(|e| EngineError::new(ErrorCode::Internal, e.to_string()))?;
                        TaggedValue::Tensor(Arc::new(view))
                    }
                    Tag::Int => TaggedValue::Int(first_int.unwrap_or(0)),
                    Tag::Bool => TaggedValue::Bool(true),
                    Tag::String => TaggedValue::String(name.to_string()),
                    Tag::ListDouble => TaggedValue::ListDouble(vec![0.25, 0.75]),
                    other => TaggedValue::Unrecognized { code: other.code() },
                })
            })
            .collect()
    }
}

/// `forward(Tensor[Float, 2x2], Int) -> (Tensor, Int)`
pub fn forward_meta() -> MethodMeta {
    MethodMeta::new("forward")
        .with_tensor_input(TensorInfo::new(ScalarType::Float, vec![2, 2]))
        .with_input(Tag::Int)
        .with_tensor_output(TensorInfo::new(ScalarType::Float, vec![2, 2]))
        .with_output(Tag::Int)
}

/// `sleep(Int) -> Int`: sleeps the given milliseconds and echoes them
pub fn sleep_meta() -> MethodMeta {
    MethodMeta::new("sleep").with_input(Tag::Int).with_output(Tag::Int)
}

/// `opaque() -> ListScalar`: output the codec cannot decode
pub fn opaque_meta() -> MethodMeta {
    MethodMeta::new("opaque").with_output(Tag::ListScalar)
}

/// A dedicated two-worker bridge
pub fn test_bridge() -> Arc<ExecutionBridge> {
    Arc::new(ExecutionBridge::with_config(BridgeConfig::new().num_workers(2)).unwrap())
}

/// Loaded module over an in-memory program with the standard methods.
pub fn loaded_module() -> (Module, Arc<Recorder>) {
    let (module, recorder) = module_for(ModelSource::buffer(b"PTE0".to_vec()));
    module.load().unwrap();
    (module, recorder)
}

/// Unloaded module over `source` with the standard methods.
pub fn module_for(source: ModelSource) -> (Module, Arc<Recorder>) {
    init_tracing();
    let (engine, recorder) = RecordingEngine::new(vec![forward_meta(), sleep_meta(), opaque_meta()]);
    let module = Module::builder(source)
        .engine(Box::new(engine))
        .bridge(test_bridge())
        .build()
        .unwrap();
    (module, recorder)
}

/// Float tensor from flat values and a shape
pub fn float_tensor(values: &[f64], shape: Vec<usize>) -> HostValue {
    HostValue::from(TensorView::from_values(values, ScalarType::Float, shape, None, None).unwrap())
}
