//! Single-resolution completion slot
//!
//! [`channel`] creates a connected [`Completer`] / [`Pending`] pair. The
//! worker side holds the completer and writes the outcome exactly once; the
//! caller side holds the pending handle and only reads the slot after the
//! completion signal.
//!
//! ## State Machine
//!
//! ```text
//! Pending -> Running -> Resolved
//!                    -> Rejected
//! ```
//!
//! A completer dropped without resolving rejects the slot with
//! `BridgeError::Abandoned`, so a pending handle never waits forever.
//! Dropping the pending handle is always allowed; the work still runs and
//! its outcome is discarded.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tensorbridge_core::{BridgeError, Error, Result};

/// Observable state of a submitted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingState {
    /// Queued, not yet picked up by a worker
    Pending,
    /// A worker is executing the unit
    Running,
    /// Finished with a value
    Resolved,
    /// Finished with an error
    Rejected,
}

impl PendingState {
    /// True for Resolved and Rejected
    pub fn is_terminal(self) -> bool {
        matches!(self, PendingState::Resolved | PendingState::Rejected)
    }
}

struct Slot<T> {
    state: PendingState,
    outcome: Option<Result<T>>,
    waker: Option<Waker>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    done: Condvar,
}

impl<T> Shared<T> {
    fn new(state: PendingState, outcome: Option<Result<T>>) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot {
                state,
                outcome,
                waker: None,
            }),
            done: Condvar::new(),
        })
    }
}

/// Create a connected completer / pending pair.
pub fn channel<T>() -> (Completer<T>, Pending<T>) {
    let shared = Shared::new(PendingState::Pending, None);
    (
        Completer {
            shared: Some(Arc::clone(&shared)),
        },
        Pending { shared },
    )
}

/// Write side of the slot. Resolves at most once.
pub struct Completer<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Completer<T> {
    /// Record that a worker has started the unit.
    pub fn mark_running(&self) {
        if let Some(shared) = &self.shared {
            let mut slot = shared.slot.lock();
            if slot.state == PendingState::Pending {
                slot.state = PendingState::Running;
            }
        }
    }

    /// Resolve with a value.
    pub fn resolve(self, value: T) {
        self.complete(Ok(value));
    }

    /// Reject with an error.
    pub fn reject(self, error: Error) {
        self.complete(Err(error));
    }

    /// Resolve or reject from a result.
    pub fn complete(mut self, outcome: Result<T>) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Result<T>) {
        let Some(shared) = self.shared.take() else {
            return;
        };
        let waker = {
            let mut slot = shared.slot.lock();
            slot.state = if outcome.is_ok() {
                PendingState::Resolved
            } else {
                PendingState::Rejected
            };
            slot.outcome = Some(outcome);
            slot.waker.take()
        };
        shared.done.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if self.shared.is_some() {
            self.finish(Err(BridgeError::Abandoned.into()));
        }
    }
}

/// Read side of the slot: a handle to a unit's eventual outcome.
///
/// Block on it with [`Pending::wait`] or `.await` it; both observe the same
/// single outcome.
pub struct Pending<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Pending<T> {
    /// A handle that is already resolved.
    pub fn resolved(value: T) -> Self {
        Self {
            shared: Shared::new(PendingState::Resolved, Some(Ok(value))),
        }
    }

    /// A handle that is already rejected.
    pub fn rejected(error: Error) -> Self {
        Self {
            shared: Shared::new(PendingState::Rejected, Some(Err(error))),
        }
    }

    /// Current state
    pub fn state(&self) -> PendingState {
        self.shared.slot.lock().state
    }

    /// Check if the unit has finished.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Take the outcome if the unit has finished.
    ///
    /// Returns `None` while the unit is still pending or running, and after
    /// the outcome has already been taken.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        self.shared.slot.lock().outcome.take()
    }

    /// Block until the unit finishes and return its outcome.
    pub fn wait(self) -> Result<T> {
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(outcome) = slot.outcome.take() {
                return outcome;
            }
            if slot.state.is_terminal() {
                // outcome already taken through try_take
                return Err(BridgeError::Abandoned.into());
            }
            self.shared.done.wait(&mut slot);
        }
    }

    /// Block for at most `timeout`.
    ///
    /// Returns `None` if the unit is still running when the timeout expires;
    /// the handle stays usable.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<T>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(outcome) = slot.outcome.take() {
                return Some(outcome);
            }
            if slot.state.is_terminal() {
                return None;
            }
            if self.shared.done.wait_until(&mut slot, deadline).timed_out() {
                return slot.outcome.take();
            }
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.slot.lock();
        if let Some(outcome) = slot.outcome.take() {
            return Poll::Ready(outcome);
        }
        if slot.state.is_terminal() {
            return Poll::Ready(Err(BridgeError::Abandoned.into()));
        }
        slot.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").field("state", &self.state()).finish()
    }
}
