//! Simulated axis.
//!
//! `SimAxis` implements the full [`Axis`] capability set without hardware:
//!
//! - Travel limits are enforced with [`TRAVEL_LIMIT_TOLERANCE`]; a rejected
//!   move latches the matching fault flag.
//! - With `velocity` configured a move takes `|delta| / velocity` seconds;
//!   blocking moves sleep for it, non-blocking moves report progress through
//!   `position()` and `is_move_complete()`. Without it moves are instant.
//! - Group membership is tracked locally.
//! - Datalogging uses a [`PositionLog`] sized by `log_capacity`.

use super::datalog::{PositionLog, write_log_file};
use parking_lot::Mutex;
use stage_common::hal::axis::{Axis, AxisError};
use stage_common::hal::config::AxisSettings;
use stage_common::hal::consts::TRAVEL_LIMIT_TOLERANCE;
use stage_common::hal::types::{AxisFaults, AxisId, GroupId, MoveWait};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// A move in progress (or finished) on the simulated axis.
#[derive(Debug, Clone, Copy)]
struct Motion {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl Motion {
    fn position_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.duration || self.duration.is_zero() {
            return self.to;
        }
        let fraction = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * fraction
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started))
    }
}

#[derive(Debug)]
struct SimState {
    position: f64,
    motion: Option<Motion>,
    groups: BTreeSet<GroupId>,
    faults: AxisFaults,
    log: PositionLog,
}

impl SimState {
    fn current_position(&self, now: Instant) -> f64 {
        self.motion
            .map(|m| m.position_at(now))
            .unwrap_or(self.position)
    }
}

/// Software-emulated axis.
pub struct SimAxis {
    settings: AxisSettings,
    state: Mutex<SimState>,
}

impl SimAxis {
    /// Create a simulated axis at position 0.
    pub fn new(settings: AxisSettings) -> Self {
        Self::with_position(settings, 0.0)
    }

    /// Create a simulated axis at `position`.
    pub fn with_position(settings: AxisSettings, position: f64) -> Self {
        let log = PositionLog::new(settings.log_capacity);
        Self {
            settings,
            state: Mutex::new(SimState {
                position,
                motion: None,
                groups: BTreeSet::new(),
                faults: AxisFaults::empty(),
                log,
            }),
        }
    }

    /// Axis settings.
    pub fn settings(&self) -> &AxisSettings {
        &self.settings
    }

    /// Number of samples currently held by the datalog.
    pub fn logged_samples(&self) -> usize {
        self.state.lock().log.len()
    }

    fn check_travel(&self, position: f64) -> Result<(), AxisError> {
        let (min, max) = (self.settings.min_limit, self.settings.max_limit);
        let violated = if position < min && (position - min).abs() > TRAVEL_LIMIT_TOLERANCE {
            Some((min, AxisFaults::TRAVEL_LIMIT_NEG))
        } else if position > max && (position - max).abs() > TRAVEL_LIMIT_TOLERANCE {
            Some((max, AxisFaults::TRAVEL_LIMIT_POS))
        } else {
            None
        };

        match violated {
            Some((limit, fault)) => {
                self.state.lock().faults |= fault;
                warn!(
                    "{}: rejected move to {:.3} (travel {:.3}..{:.3})",
                    self.settings.name, position, min, max
                );
                Err(AxisError::TravelLimit {
                    axis: self.settings.id,
                    commanded: position,
                    limit,
                })
            }
            None => Ok(()),
        }
    }

    fn overflow(&self, state: &mut SimState) -> AxisError {
        state.faults |= AxisFaults::LOG_OVERFLOW;
        AxisError::LoggingOverflow {
            axis: self.settings.id,
            capacity: state.log.capacity(),
        }
    }

    /// Time left on the current move.
    fn remaining_motion(&self) -> Duration {
        let state = self.state.lock();
        state
            .motion
            .map(|m| m.remaining(Instant::now()))
            .unwrap_or_default()
    }
}

impl Axis for SimAxis {
    fn id(&self) -> AxisId {
        self.settings.id
    }

    fn name(&self) -> String {
        format!("sim{}{}", self.settings.name, self.settings.id)
    }

    fn move_absolute(&self, position: f64, wait: MoveWait) -> Result<(), AxisError> {
        self.check_travel(position)?;

        let duration = {
            let mut state = self.state.lock();
            let now = Instant::now();
            let from = state.current_position(now);
            let duration = match self.settings.velocity {
                Some(v) => Duration::try_from_secs_f64((position - from).abs() / v).map_err(
                    |_| AxisError::Fault {
                        axis: self.settings.id,
                        reason: format!("move to {position:.3} at velocity {v} cannot be timed"),
                    },
                )?,
                None => Duration::ZERO,
            };

            if state.log.record(now, position).is_err() {
                return Err(self.overflow(&mut state));
            }

            state.position = from;
            state.motion = Some(Motion {
                from,
                to: position,
                started: now,
                duration,
            });
            duration
        };

        trace!(
            "{}: move {:.3} ({:?}, {:?})",
            self.settings.name, position, wait, duration
        );

        if wait == MoveWait::Blocking {
            std::thread::sleep(self.remaining_motion());
        }
        Ok(())
    }

    fn position(&self) -> f64 {
        self.state.lock().current_position(Instant::now())
    }

    fn is_move_complete(&self) -> bool {
        self.remaining_motion().is_zero()
    }

    fn add_to_group(&self, group: GroupId) -> Result<(), AxisError> {
        debug!("{}: joined group {}", self.settings.name, group);
        self.state.lock().groups.insert(group);
        Ok(())
    }

    fn remove_from_group(&self, group: GroupId) -> Result<(), AxisError> {
        if self.state.lock().groups.remove(&group) {
            debug!("{}: left group {}", self.settings.name, group);
        }
        Ok(())
    }

    fn groups(&self) -> Vec<GroupId> {
        self.state.lock().groups.iter().copied().collect()
    }

    fn start_logging(&self) -> Result<(), AxisError> {
        let mut state = self.state.lock();
        let now = Instant::now();
        let position = state.current_position(now);
        if state.log.arm(now, position).is_err() {
            return Err(self.overflow(&mut state));
        }
        Ok(())
    }

    fn wait_for_logging_complete(&self, path: &Path) -> Result<(), AxisError> {
        if !self.state.lock().log.is_armed() {
            return Err(AxisError::LoggingNotStarted(self.settings.id));
        }

        // The drive keeps sampling until the move it is tracking ends.
        std::thread::sleep(self.remaining_motion());

        let samples = {
            let mut state = self.state.lock();
            let now = Instant::now();
            let position = state.current_position(now);
            if state.log.record(now, position).is_err() {
                trace!("{}: final sample dropped, log full", self.settings.name);
            }
            state.log.disarm()
        };

        write_log_file(path, &self.name(), &samples).map_err(|e| AxisError::LogWrite {
            axis: self.settings.id,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(
            "{}: flushed {} samples to {:?}",
            self.settings.name,
            samples.len(),
            path
        );
        Ok(())
    }

    fn faults(&self) -> AxisFaults {
        self.state.lock().faults
    }

    fn reset_faults(&self) {
        self.state.lock().faults = AxisFaults::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn axis(velocity: Option<f64>) -> SimAxis {
        let mut settings = AxisSettings::new(2, "y", -5.0, 100.0);
        settings.velocity = velocity;
        SimAxis::new(settings)
    }

    #[test]
    fn test_instant_move() {
        let axis = axis(None);
        axis.move_absolute(42.0, MoveWait::NonBlocking).unwrap();
        assert_eq!(axis.position(), 42.0);
        assert!(axis.is_move_complete());
    }

    #[test]
    fn test_move_relative_uses_current_position() {
        let axis = axis(None);
        axis.move_absolute(10.0, MoveWait::Blocking).unwrap();
        axis.move_relative(-2.5, MoveWait::Blocking).unwrap();
        assert_eq!(axis.position(), 7.5);
    }

    #[test]
    fn test_limit_tolerance_accepts_small_overshoot() {
        let axis = axis(None);
        assert!(axis.move_absolute(100.0005, MoveWait::Blocking).is_ok());
        assert!(axis.faults().is_empty());
    }

    #[test]
    fn test_travel_limit_rejected_and_latched() {
        let axis = axis(None);
        let err = axis.move_absolute(150.0, MoveWait::Blocking).unwrap_err();
        assert!(matches!(err, AxisError::TravelLimit { limit, .. } if limit == 100.0));
        assert_eq!(axis.faults(), AxisFaults::TRAVEL_LIMIT_POS);
        assert_eq!(axis.position(), 0.0);

        axis.move_absolute(-6.0, MoveWait::Blocking).unwrap_err();
        assert!(axis.faults().contains(AxisFaults::TRAVEL_LIMIT_NEG));

        axis.reset_faults();
        assert!(axis.faults().is_empty());
    }

    #[test]
    fn test_timed_move_blocks() {
        let axis = axis(Some(1000.0));
        let start = Instant::now();
        axis.move_absolute(50.0, MoveWait::Blocking).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(45));
        assert_eq!(axis.position(), 50.0);
    }

    #[test]
    fn test_timed_move_non_blocking_in_progress() {
        let axis = axis(Some(100.0));
        axis.move_absolute(50.0, MoveWait::NonBlocking).unwrap();
        assert!(!axis.is_move_complete());
        assert!(axis.position() < 50.0);
    }

    #[test]
    fn test_untimeable_move_faults_instead_of_panicking() {
        let axis = axis(Some(1e-30));
        let err = axis.move_absolute(50.0, MoveWait::NonBlocking).unwrap_err();
        assert!(matches!(err, AxisError::Fault { axis: AxisId(2), .. }));
        assert_eq!(axis.position(), 0.0);
        assert!(axis.is_move_complete());
    }

    #[test]
    fn test_group_membership() {
        let axis = axis(None);
        let g1 = GroupId::new(1).unwrap();
        let g3 = GroupId::new(3).unwrap();
        axis.add_to_group(g3).unwrap();
        axis.add_to_group(g1).unwrap();
        assert_eq!(axis.groups(), vec![g1, g3]);
        axis.remove_from_group(g3).unwrap();
        axis.remove_from_group(g3).unwrap();
        assert_eq!(axis.groups(), vec![g1]);
    }

    #[test]
    fn test_logging_cycle_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("axis2_positions.log");
        let axis = axis(None);

        axis.start_logging().unwrap();
        axis.move_absolute(10.0, MoveWait::NonBlocking).unwrap();
        axis.move_absolute(10.0, MoveWait::Blocking).unwrap();
        assert_eq!(axis.logged_samples(), 3);

        axis.wait_for_logging_complete(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        // header, column names, start sample, two moves, final sample
        assert_eq!(content.lines().count(), 6);
        assert_eq!(axis.logged_samples(), 0);
    }

    #[test]
    fn test_wait_without_start_fails() {
        let dir = TempDir::new().unwrap();
        let axis = axis(None);
        let err = axis
            .wait_for_logging_complete(&dir.path().join("never.log"))
            .unwrap_err();
        assert_eq!(err, AxisError::LoggingNotStarted(AxisId(2)));
    }

    #[test]
    fn test_log_overflow_fails_move() {
        let mut settings = AxisSettings::new(2, "y", -5.0, 100.0);
        settings.log_capacity = 2;
        let axis = SimAxis::new(settings);

        axis.start_logging().unwrap();
        axis.move_absolute(1.0, MoveWait::Blocking).unwrap();
        let err = axis.move_absolute(2.0, MoveWait::Blocking).unwrap_err();
        assert!(matches!(err, AxisError::LoggingOverflow { capacity: 2, .. }));
        assert!(axis.faults().contains(AxisFaults::LOG_OVERFLOW));
    }
}
