//! Shared test fixtures for the executor crate.


use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tensorbridge_core::{
    EngineError, ErrorCode, MethodMeta, Tag, TaggedValue, TensorView, TypedBuffer,
};
use tensorbridge_engine::{Engine, EngineResult, ProgramData, Verification};

/// Engine double that records calls.
///
/// Tensor outputs echo the first tensor argument through a fresh borrowed
/// arena, the way a real engine hands out views into its own memory.
#[derive(Default)]
pub(crate) struct StubEngine {
    methods: HashMap<String, MethodMeta>,
    failure: Option<ErrorCode>,
    delay: Option<Duration>,
    programs_loaded: AtomicUsize,
    last_verification: Mutex<Option<Verification>>,
    methods_loaded: Mutex<Vec<String>>,
    execute_calls: Arc<AtomicUsize>,
    last_args: Mutex<Option<Vec<TaggedValue>>>,
}

impl StubEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_method(mut self, meta: MethodMeta) -> Self {
        self.methods.insert(meta.name().to_string(), meta);
        self
    }

    pub(crate) fn failing_with(mut self, code: ErrorCode) -> Self {
        self.failure = Some(code);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn execute_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.execute_calls)
    }

    pub(crate) fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_args(&self) -> Option<Vec<TaggedValue>> {
        self.last_args.lock().clone()
    }

    pub(crate) fn programs_loaded(&self) -> usize {
        self.programs_loaded.load(Ordering::SeqCst)
    }

    pub(crate) fn last_verification(&self) -> Option<Verification> {
        *self.last_verification.lock()
    }

    pub(crate) fn loaded_methods(&self) -> Vec<String> {
        self.methods_loaded.lock().clone()
    }

    fn lookup(&self, name: &str) -> EngineResult<&MethodMeta> {
        self.methods.get(name).ok_or_else(|| {
            EngineError::new(ErrorCode::NotFound, format!("method '{}' not found", name))
        })
    }
}

impl Engine for StubEngine {
    fn load_program(
        &mut self,
        program: &ProgramData,
        verification: Verification,
    ) -> EngineResult<()> {
        if program.is_empty() {
            return Err(EngineError::from_code(ErrorCode::InvalidProgram));
        }
        self.programs_loaded.fetch_add(1, Ordering::SeqCst);
        *self.last_verification.lock() = Some(verification);
        Ok(())
    }

    fn method_names(&self) -> EngineResult<Vec<String>> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn load_method(&mut self, name: &str) -> EngineResult<()> {
        self.lookup(name)?;
        self.methods_loaded.lock().push(name.to_string());
        Ok(())
    }

    fn method_meta(&self, name: &str) -> EngineResult<MethodMeta> {
        self.lookup(name).cloned()
    }

    fn execute_method(&self, name: &str, args: &[TaggedValue]) -> EngineResult<Vec<TaggedValue>> {
        let meta = self.lookup(name)?;
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock() = Some(args.to_vec());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(code) = self.failure {
            return Err(EngineError::from_code(code));
        }

        let echo = args.iter().find_map(TaggedValue::as_tensor);
        meta.output_tags()
            .iter()
            .map(|tag| {
                Ok(match tag {
                    Tag::Tensor => {
                        let source = echo.ok_or_else(|| {
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
                    Tag::Int => TaggedValue::Int(args.len() as i64),
                    Tag::Double => TaggedValue::Double(0.5),
                    Tag::Bool => TaggedValue::Bool(true),
                    Tag::String => TaggedValue::String(name.to_string()),
                    other => TaggedValue::Unrecognized { code: other.code() },
                })
            })
            .collect()
    }
}
