//! Background execution bridge
//!
//! An `ExecutionBridge` owns a pool of named worker threads that pull boxed
//! units of work from a shared queue. Each submission gets its own
//! [`Pending`] handle that resolves exactly once.
//!
//! ## Guarantees
//!
//! - Each submitted unit runs exactly once, on one worker.
//! - A unit that panics rejects its own handle with `Panicked`; the worker
//!   keeps serving the queue.
//! - Units queued when the bridge shuts down are dropped unstarted, which
//!   rejects their handles with `Abandoned`. Units already running finish.
//! - No completion order is imposed between independent submissions.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use tensorbridge_core::{BridgeError, Error, Result};
use tracing::{debug, error, warn};

use crate::config::BridgeConfig;
use crate::pending::{channel, Pending};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Queue {
    jobs: VecDeque<Job>,
    shut_down: bool,
}

struct Inner {
    queue: Mutex<Queue>,
    available: Condvar,
    max_queue_depth: usize,
}

/// Worker pool that runs submitted units off the caller's thread.
pub struct ExecutionBridge {
    inner: Arc<Inner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_ids: Vec<ThreadId>,
    config: BridgeConfig,
}

impl ExecutionBridge {
    /// Start a bridge with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(BridgeConfig::default())
    }

    /// Start a bridge with the given settings.
    pub fn with_config(config: BridgeConfig) -> Result<Self> {
        config.validate()?;

        let inner = Arc::new(Inner {
            queue: Mutex::new(Queue {
                jobs: VecDeque::new(),
                shut_down: false,
            }),
            available: Condvar::new(),
            max_queue_depth: config.max_queue_depth,
        });

        let mut workers = Vec::with_capacity(config.num_workers);
        for id in 0..config.num_workers {
            match spawn_worker(id, Arc::clone(&inner), &config) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    error!(worker = id, error = %e, "Failed to spawn bridge worker");
                    inner.queue.lock().shut_down = true;
                    inner.available.notify_all();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(e.into());
                }
            }
        }

        let worker_ids = workers.iter().map(|h| h.thread().id()).collect();
        debug!(
            workers = config.num_workers,
            max_queue_depth = config.max_queue_depth,
            "Execution bridge started"
        );

        Ok(Self {
            inner,
            workers: Mutex::new(workers),
            worker_ids,
            config,
        })
    }

    /// Submit a unit of work.
    ///
    /// Returns immediately. The handle is rejected with `QueueFull` when the
    /// queue is at capacity and with `ShutDown` after [`shutdown`](Self::shutdown).
    pub fn submit<T, F>(&self, work: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let mut queue = self.inner.queue.lock();

        if queue.shut_down {
            warn!("Submission rejected: bridge is shut down");
            return Pending::rejected(BridgeError::ShutDown.into());
        }
        let capacity = self.inner.max_queue_depth;
        if capacity > 0 && queue.jobs.len() >= capacity {
            warn!(capacity, "Submission rejected: queue is full");
            return Pending::rejected(BridgeError::QueueFull { capacity }.into());
        }

        let (completer, pending) = channel();
        queue.jobs.push_back(Box::new(move || {
            completer.mark_running();
            match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(outcome) => completer.complete(outcome),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(panic = %message, "Bridge unit panicked");
                    completer.reject(Error::Bridge(BridgeError::Panicked(message)));
                }
            }
        }));
        drop(queue);

        self.inner.available.notify_one();
        pending
    }

    /// Number of units queued but not yet started
    pub fn queued(&self) -> usize {
        self.inner.queue.lock().jobs.len()
    }

    /// Number of worker threads
    pub fn num_workers(&self) -> usize {
        self.worker_ids.len()
    }

    /// Settings the bridge was started with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Check if the bridge has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.inner.queue.lock().shut_down
    }

    /// Stop accepting work, abandon queued units and join the workers.
    ///
    /// Units already running finish first. Idempotent.
    pub fn shutdown(&self) {
        let abandoned: Vec<Job> = {
            let mut queue = self.inner.queue.lock();
            queue.shut_down = true;
            queue.jobs.drain(..).collect()
        };
        self.inner.available.notify_all();

        if !abandoned.is_empty() {
            warn!(count = abandoned.len(), "Abandoning queued units at shutdown");
        }
        // dropping an unstarted job drops its completer, which rejects the handle
        drop(abandoned);

        // a worker cannot join itself
        let current = thread::current().id();
        if self.worker_ids.contains(&current) {
            return;
        }
        let workers: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for handle in workers {
            let _ = handle.join();
        }
    }
}

impl Drop for ExecutionBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ExecutionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionBridge")
            .field("workers", &self.num_workers())
            .field("queued", &self.queued())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

fn spawn_worker(
    id: usize,
    inner: Arc<Inner>,
    config: &BridgeConfig,
) -> std::result::Result<JoinHandle<()>, BridgeError> {
    let mut builder = thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, id));
    if let Some(stack_size) = config.stack_size {
        builder = builder.stack_size(stack_size);
    }

    builder
        .spawn(move || {
            debug!(worker = id, "Bridge worker started");
            loop {
                let job = {
                    let mut queue = inner.queue.lock();
                    loop {
                        if let Some(job) = queue.jobs.pop_front() {
                            break Some(job);
                        }
                        if queue.shut_down {
                            break None;
                        }
                        inner.available.wait(&mut queue);
                    }
                };
                match job {
                    Some(job) => job(),
                    None => break,
                }
            }
            debug!(worker = id, "Bridge worker stopped");
        })
        .map_err(|e| BridgeError::WorkerSpawn(e.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

static DEFAULT_BRIDGE: OnceCell<Arc<ExecutionBridge>> = OnceCell::new();

/// The process-wide bridge, started with default settings on first use.
pub fn default_bridge() -> Result<Arc<ExecutionBridge>> {
    DEFAULT_BRIDGE
        .get_or_try_init(|| ExecutionBridge::new().map(Arc::new))
        .map(Arc::clone)
}
