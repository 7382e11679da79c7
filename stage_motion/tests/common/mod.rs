//! Shared fixtures: an axis that journals every call.

#![allow(dead_code)]

use parking_lot::Mutex;
use stage_common::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// One call observed on a [`RecordingAxis`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Move {
        axis: AxisId,
        target: f64,
        wait: MoveWait,
    },
    StartLogging(AxisId),
    FlushLog(AxisId, PathBuf),
    Joined(AxisId, GroupId),
    Left(AxisId, GroupId),
}

/// Calls from every axis sharing it, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    /// Targets of every move of `wait` kind on `axis`.
    pub fn targets(&self, axis: AxisId, wait: MoveWait) -> Vec<f64> {
        self.0
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Move {
                    axis: a,
                    target,
                    wait: w,
                } if *a == axis && *w == wait => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// Axis ids of every move of `wait` kind, in order.
    pub fn move_order(&self, wait: MoveWait) -> Vec<AxisId> {
        self.0
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Move { axis, wait: w, .. } if *w == wait => Some(*axis),
                _ => None,
            })
            .collect()
    }

    /// Every move target attempted, in order, with duplicates removed.
    pub fn distinct_targets(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for event in self.0.lock().iter() {
            if let Event::Move { target, .. } = event {
                if out.last() != Some(target) {
                    out.push(*target);
                }
            }
        }
        out
    }
}

/// Test axis journaling every call, optionally failing at one target.
pub struct RecordingAxis {
    id: AxisId,
    journal: Journal,
    fail_at: Option<f64>,
    stuck_in_group: bool,
    move_time: Duration,
    position: Mutex<f64>,
    groups: Mutex<BTreeSet<GroupId>>,
    logging: Mutex<bool>,
}

impl RecordingAxis {
    pub fn new(id: u8, journal: &Journal) -> Self {
        Self {
            id: AxisId(id),
            journal: journal.clone(),
            fail_at: None,
            stuck_in_group: false,
            move_time: Duration::ZERO,
            position: Mutex::new(0.0),
            groups: Mutex::new(BTreeSet::new()),
            logging: Mutex::new(false),
        }
    }

    /// Reject moves to `target` as a travel-limit violation.
    pub fn failing_at(mut self, target: f64) -> Self {
        self.fail_at = Some(target);
        self
    }

    /// Reject every `remove_from_group`, keeping the membership.
    pub fn stuck_in_group(mut self) -> Self {
        self.stuck_in_group = true;
        self
    }

    /// Make blocking moves take `move_time`.
    pub fn with_move_time(mut self, move_time: Duration) -> Self {
        self.move_time = move_time;
        self
    }

    pub fn handle(self) -> AxisHandle {
        Arc::new(self)
    }
}

impl Axis for RecordingAxis {
    fn id(&self) -> AxisId {
        self.id
    }

    fn name(&self) -> String {
        format!("rec{}", self.id)
    }

    fn move_absolute(&self, position: f64, wait: MoveWait) -> Result<(), AxisError> {
        self.journal.push(Event::Move {
            axis: self.id,
            target: position,
            wait,
        });
        if self.fail_at == Some(position) {
            return Err(AxisError::TravelLimit {
                axis: self.id,
                commanded: position,
                limit: position - 1.0,
            });
        }
        if wait == MoveWait::Blocking && !self.move_time.is_zero() {
            std::thread::sleep(self.move_time);
        }
        *self.position.lock() = position;
        Ok(())
    }

    fn position(&self) -> f64 {
        *self.position.lock()
    }

    fn is_move_complete(&self) -> bool {
        true
    }

    fn add_to_group(&self, group: GroupId) -> Result<(), AxisError> {
        self.journal.push(Event::Joined(self.id, group));
        self.groups.lock().insert(group);
        Ok(())
    }

    fn remove_from_group(&self, group: GroupId) -> Result<(), AxisError> {
        if self.stuck_in_group {
            return Err(AxisError::Fault {
                axis: self.id,
                reason: format!("drive refused to leave group {group}"),
            });
        }
        self.journal.push(Event::Left(self.id, group));
        self.groups.lock().remove(&group);
        Ok(())
    }

    fn groups(&self) -> Vec<GroupId> {
        self.groups.lock().iter().copied().collect()
    }

    fn start_logging(&self) -> Result<(), AxisError> {
        self.journal.push(Event::StartLogging(self.id));
        *self.logging.lock() = true;
        Ok(())
    }

    fn wait_for_logging_complete(&self, path: &Path) -> Result<(), AxisError> {
        if !std::mem::replace(&mut *self.logging.lock(), false) {
            return Err(AxisError::LoggingNotStarted(self.id));
        }
        self.journal.push(Event::FlushLog(self.id, path.to_path_buf()));
        Ok(())
    }

    fn faults(&self) -> AxisFaults {
        AxisFaults::empty()
    }

    fn reset_faults(&self) {}
}
