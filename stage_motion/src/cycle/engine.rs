//! Cycle engine: one background worker per run.
//!
//! ```text
//! Idle --start()--> Running --(completed | stop() observed | axis fault)--> Idle
//! ```
//!
//! `start` and `stop` never block the caller. A new run may only start once
//! the previous worker has exited.

use super::planner::plan;
use super::request::CycleRequest;
use super::run::{CycleProgress, RunOutcome, RunShared};
use super::worker::CycleWorker;
use crate::error::CycleError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Worker thread name.
pub const WORKER_THREAD_NAME: &str = "cycle-tester";

/// Drives a set of axes through a position sequence on a background thread.
pub struct CycleEngine {
    log_dir: PathBuf,
    current: Mutex<Option<Arc<RunShared>>>,
}

impl CycleEngine {
    /// Create an idle engine writing position logs into `log_dir`.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            current: Mutex::new(None),
        }
    }

    /// Directory receiving position logs.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Start a run.
    ///
    /// # Errors
    /// - `CycleError::AlreadyRunning` if the previous worker has not exited
    /// - `CycleError::LogDirectory` if datalogging and the log directory
    ///   cannot be created
    /// - `CycleError::Spawn` if the worker thread cannot be created
    pub fn start(&self, request: CycleRequest) -> Result<(), CycleError> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|run| !run.is_finished()) {
            return Err(CycleError::AlreadyRunning);
        }

        if request.options().datalog {
            std::fs::create_dir_all(&self.log_dir).map_err(|e| CycleError::LogDirectory {
                path: self.log_dir.clone(),
                reason: e.to_string(),
            })?;
        }

        let sequence = plan(request.positions(), request.options().permute);
        info!(
            "Starting cycler: axes {:?}, {} positions ({} after expansion), {:?}",
            request.axis_ids(),
            request.positions().len(),
            sequence.len(),
            request.options()
        );

        let run = Arc::new(RunShared::new());
        let worker = CycleWorker::new(request, sequence, self.log_dir.clone(), run.clone());

        // Detached: completion is observed through the run's outcome.
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || worker.run())
            .map_err(|e| CycleError::Spawn(e.to_string()))?;

        *current = Some(run);
        Ok(())
    }

    /// Ask the current run to stop at its next checkpoint.
    ///
    /// Does not wait. Safe when idle or when already stopping.
    pub fn stop(&self) {
        match self.current.lock().as_ref() {
            Some(run) if !run.is_finished() => {
                if run.request_cancel() {
                    info!("Stop requested");
                } else {
                    debug!("Stop already requested");
                }
            }
            _ => debug!("Stop ignored: no run in progress"),
        }
    }

    /// True while a worker is alive.
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|run| !run.is_finished())
    }

    /// Block until the current run's worker exits. `None` if never started.
    pub fn wait(&self) -> Option<RunOutcome> {
        let run = self.current.lock().clone()?;
        Some(run.wait())
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<RunOutcome> {
        let run = self.current.lock().clone()?;
        run.wait_timeout(timeout)
    }

    /// Outcome of the most recent run, if it has ended.
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.current.lock().as_ref().and_then(|run| run.outcome())
    }

    /// Progress of the most recent run.
    pub fn progress(&self) -> Option<CycleProgress> {
        self.current.lock().as_ref().map(|run| run.progress())
    }
}

impl Drop for CycleEngine {
    fn drop(&mut self) {
        if let Some(run) = self.current.get_mut().as_ref() {
            run.request_cancel();
        }
    }
}

impl std::fmt::Debug for CycleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleEngine")
            .field("log_dir", &self.log_dir)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleOptions;
    use stage_common::hal::axis::AxisHandle;
    use stage_common::hal::config::AxisSettings;
    use stage_hal::drivers::simulation::SimAxis;

    fn axis(id: u8) -> AxisHandle {
        Arc::new(SimAxis::new(AxisSettings::new(id, format!("a{id}"), 0.0, 100.0)))
    }

    #[test]
    fn test_idle_engine() {
        let engine = CycleEngine::new("logs");
        assert!(!engine.is_running());
        assert_eq!(engine.wait(), None);
        assert_eq!(engine.last_outcome(), None);
        assert_eq!(engine.progress(), None);
        engine.stop();
    }

    #[test]
    fn test_single_run_completes() {
        let engine = CycleEngine::new("logs");
        let request = CycleRequest::new(vec![axis(1)], vec![1.0], CycleOptions::default()).unwrap();
        engine.start(request).unwrap();
        assert_eq!(engine.wait(), Some(RunOutcome::Completed { visits: 1 }));
        assert_eq!(engine.wait_timeout(Duration::ZERO), engine.last_outcome());
        assert_eq!(engine.progress().map(|p| p.completed_visits), Some(1));
    }

    #[test]
    fn test_empty_axes_completes_immediately() {
        let engine = CycleEngine::new("logs");
        let request = CycleRequest::new(vec![], vec![1.0, 2.0], CycleOptions::default()).unwrap();
        engine.start(request).unwrap();
        assert_eq!(engine.wait(), Some(RunOutcome::Completed { visits: 0 }));
        assert!(!engine.is_running());
    }
}
