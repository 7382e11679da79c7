//! State shared between the engine and one run's worker.

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use stage_common::hal::axis::AxisError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every position was visited.
    Completed {
        /// Position visits completed.
        visits: usize,
    },
    /// Stopped by request.
    Cancelled {
        /// Position visits completed before the stop was observed.
        visits: usize,
    },
    /// An axis error ended the run.
    Faulted {
        /// Index into the expanded sequence of the failed position.
        position_index: usize,
        /// Visits completed before the fault.
        visits: usize,
        /// Error raised by the axis.
        error: AxisError,
    },
    /// The worker exited without reporting (it panicked).
    Aborted(String),
}

impl RunOutcome {
    /// Position visits completed.
    pub fn visits(&self) -> usize {
        match self {
            Self::Completed { visits }
            | Self::Cancelled { visits }
            | Self::Faulted { visits, .. } => *visits,
            Self::Aborted(_) => 0,
        }
    }

    /// True for `Faulted` and `Aborted`.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Faulted { .. } | Self::Aborted(_))
    }
}

/// Snapshot of where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CycleProgress {
    /// Index into the expanded sequence being visited.
    pub position_index: usize,
    /// Index into the request's axes of the last axis commanded.
    pub axis_index: usize,
    /// Position visits completed.
    pub completed_visits: usize,
}

/// One run: cancellation signal, progress counters and final outcome.
#[derive(Debug, Default)]
pub(crate) struct RunShared {
    cancel: AtomicBool,
    position_index: AtomicUsize,
    axis_index: AtomicUsize,
    completed: AtomicUsize,
    outcome: Mutex<Option<RunOutcome>>,
    finished: Condvar,
}

impl RunShared {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arm the cancellation signal. Returns `true` on the first call only.
    pub(crate) fn request_cancel(&self) -> bool {
        !self.cancel.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub(crate) fn set_position(&self, index: usize) {
        self.position_index.store(index, Ordering::Relaxed);
    }

    pub(crate) fn set_axis(&self, index: usize) {
        self.axis_index.store(index, Ordering::Relaxed);
    }

    /// Count a completed visit, returning the new total.
    pub(crate) fn visit_completed(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub(crate) fn progress(&self) -> CycleProgress {
        CycleProgress {
            position_index: self.position_index.load(Ordering::Relaxed),
            axis_index: self.axis_index.load(Ordering::Relaxed),
            completed_visits: self.completed(),
        }
    }

    /// Record the outcome (first one wins) and wake waiters.
    pub(crate) fn finish(&self, outcome: RunOutcome) {
        let mut slot = self.outcome.lock();
        if slot.is_none() {
            *slot = Some(outcome);
        }
        self.finished.notify_all();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.outcome.lock().is_some()
    }

    pub(crate) fn outcome(&self) -> Option<RunOutcome> {
        (*self.outcome.lock()).clone()
    }

    /// Block until the worker has finished.
    pub(crate) fn wait(&self) -> RunOutcome {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.finished.wait(&mut slot);
        }
    }

    /// Block until the worker has finished or `timeout` elapses.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<RunOutcome> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return Some(outcome.clone());
            }
            if self.finished.wait_until(&mut slot, deadline).timed_out() {
                return (*slot).clone();
            }
        }
    }
}

/// Reports `Aborted` if the worker unwinds before reporting an outcome.
pub(crate) struct FinishGuard<'a>(pub(crate) &'a RunShared);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if !self.0.is_finished() {
            self.0
                .finish(RunOutcome::Aborted("cycle worker exited unexpectedly".into()));
        }
    }
}
