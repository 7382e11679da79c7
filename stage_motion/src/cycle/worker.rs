//! Cycle worker loop.
//!
//! For each target in the expanded sequence:
//!
//! ```text
//! [datalog]  start_logging on every axis
//!            for axis in order: check cancel -> non-blocking move -> delay
//!            blocking move on every axis          (skipped if cancelled above)
//! [datalog]  wait_for_logging_complete per axis -> {log_dir}/axis{ID}_positions.log
//!            check cancel
//! ```
//!
//! Cancellation is only observed at those checkpoints; an issued move is
//! never interrupted. An axis error ends the run and arms the run's own
//! cancellation signal.

use super::request::CycleRequest;
use super::run::{FinishGuard, RunOutcome, RunShared};
use stage_common::hal::axis::AxisError;
use stage_common::hal::consts::position_log_file_name;
use stage_common::hal::types::MoveWait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Result of visiting one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Reached,
    Interrupted,
}

pub(crate) struct CycleWorker {
    request: CycleRequest,
    sequence: Vec<f64>,
    log_dir: PathBuf,
    run: Arc<RunShared>,
}

impl CycleWorker {
    pub(crate) fn new(
        request: CycleRequest,
        sequence: Vec<f64>,
        log_dir: PathBuf,
        run: Arc<RunShared>,
    ) -> Self {
        Self {
            request,
            sequence,
            log_dir,
            run,
        }
    }

    /// Worker thread body.
    pub(crate) fn run(self) {
        let run = self.run.clone();
        let _guard = FinishGuard(&run);

        let outcome = self.execute();
        match &outcome {
            RunOutcome::Faulted {
                position_index,
                error,
                ..
            } => error!("Cycler faulted at position #{}: {}", position_index, error),
            other => info!("Cycler stopped after {} visits", other.visits()),
        }
        run.finish(outcome);
    }

    fn execute(&self) -> RunOutcome {
        if self.request.axes().is_empty() {
            info!("No axes selected");
            return RunOutcome::Completed { visits: 0 };
        }
        if self.sequence.is_empty() {
            info!("No positions to visit");
            return RunOutcome::Completed { visits: 0 };
        }

        let repeat = self.request.options().repeat;
        loop {
            for (index, &target) in self.sequence.iter().enumerate() {
                self.run.set_position(index);

                match self.visit(target) {
                    Ok(Visit::Reached) => {
                        self.run.visit_completed();
                    }
                    Ok(Visit::Interrupted) => {}
                    Err(error) => {
                        self.run.request_cancel();
                        return RunOutcome::Faulted {
                            position_index: index,
                            visits: self.run.completed(),
                            error,
                        };
                    }
                }

                if self.run.is_cancelled() {
                    return RunOutcome::Cancelled {
                        visits: self.run.completed(),
                    };
                }
            }

            if !repeat {
                return RunOutcome::Completed {
                    visits: self.run.completed(),
                };
            }
        }
    }

    fn visit(&self, target: f64) -> Result<Visit, AxisError> {
        let axes = self.request.axes();
        let datalog = self.request.options().datalog;
        let delay = self.request.delay();

        if datalog {
            for axis in axes {
                axis.start_logging()?;
            }
        }

        let mut visit = Visit::Reached;
        for (index, axis) in axes.iter().enumerate() {
            if self.run.is_cancelled() {
                info!(
                    "Stopping cycler before moving axis {} to {}mm",
                    axis.id(),
                    target
                );
                visit = Visit::Interrupted;
                break;
            }
            self.run.set_axis(index);
            debug!("moving axis {} to {}mm", axis.id(), target);
            axis.move_absolute(target, MoveWait::NonBlocking)?;
            pause(delay);
        }

        if visit == Visit::Reached {
            for axis in axes {
                axis.move_absolute(target, MoveWait::Blocking)?;
            }
        }

        if datalog {
            for axis in axes {
                let path = self.log_dir.join(position_log_file_name(axis.id().0));
                axis.wait_for_logging_complete(&path)?;
            }
        }

        Ok(visit)
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
