//! One hardware synchronization group.
//!
//! ## Controller sequences
//!
//! | Step    | Channel traffic (under the channel lock)                         | Axis calls                |
//! |---------|------------------------------------------------------------------|---------------------------|
//! | unbind  | `select_broadcast`, `execute("REMGRID(n);")`                     | `remove_from_group(n)`    |
//! | bind    | unbind traffic                                                   | `add_to_group(n)` in order|
//! | enable  | `select_group(n)`, push group config, prime `func_done`, call axis-on | none                 |
//!
//! Axis calls happen after the channel lock is dropped: a drive-backed axis
//! talks over the same channel, and the lock is not reentrant.

use crate::error::GroupError;
use parking_lot::Mutex;
use stage_common::hal::axis::AxisHandle;
use stage_common::hal::channel::SharedChannel;
use stage_common::hal::consts::{
    AXIS_ON_LABEL, FUNC_DONE_VARIABLE, GROUP_ENABLE_PROGRAM, INITIAL_FUNC_DONE,
    remove_group_program,
};
use stage_common::hal::types::{AxisId, GroupId};
use tracing::{debug, warn};

/// A synchronization group slot and the axes currently bound to it.
pub struct SynchronizationGroup {
    id: GroupId,
    channel: SharedChannel,
    bound: Mutex<Vec<AxisHandle>>,
}

impl SynchronizationGroup {
    pub(crate) fn new(id: GroupId, channel: SharedChannel) -> Self {
        Self {
            id,
            channel,
            bound: Mutex::new(Vec::new()),
        }
    }

    /// Group number (1..=8).
    pub fn number(&self) -> GroupId {
        self.id
    }

    /// Ids of the bound axes, in bind order.
    pub fn axes(&self) -> Vec<AxisId> {
        self.bound.lock().iter().map(|axis| axis.id()).collect()
    }

    /// True if no axis is bound.
    pub fn is_empty(&self) -> bool {
        self.bound.lock().is_empty()
    }

    /// Remove every axis from the group on the controller, then locally.
    ///
    /// Once the controller has dropped the group, every bound axis is asked
    /// to leave it and the group ends up empty; the first axis error is
    /// returned.
    pub(crate) fn unbind(&self) -> Result<(), GroupError> {
        let mut bound = self.bound.lock();
        {
            let mut channel = self.channel.lock();
            channel.select_broadcast()?;
            channel.execute(&remove_group_program(self.id.get()))?;
        }

        let mut first_error = None;
        for axis in bound.iter() {
            if let Err(e) = axis.remove_from_group(self.id) {
                warn!("group {}: axis {} failed to leave: {}", self.id, axis.id(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        bound.clear();

        debug!("group {}: unbound", self.id);
        first_error.map_or(Ok(()), |e| Err(GroupError::from(e)))
    }

    /// Replace the group's axes with `axes`.
    pub(crate) fn bind(&self, axes: &[AxisHandle]) -> Result<(), GroupError> {
        self.unbind()?;
        let mut bound = self.bound.lock();
        for axis in axes {
            axis.add_to_group(self.id)?;
            bound.push(axis.clone());
        }
        debug!("group {}: bound axes {:?}", self.id, self.axes_of(&bound));
        Ok(())
    }

    /// Enable the group: select it, push the group configuration and run
    /// the drive-side axis-on procedure.
    pub fn enable(&self) -> Result<(), GroupError> {
        let mut channel = self.channel.lock();
        channel.select_group(self.id)?;
        channel.execute(GROUP_ENABLE_PROGRAM)?;
        channel.set_long_variable(FUNC_DONE_VARIABLE, INITIAL_FUNC_DONE)?;
        channel.call_label(AXIS_ON_LABEL)?;
        debug!("group {}: enabled", self.id);
        Ok(())
    }

    fn axes_of(&self, bound: &[AxisHandle]) -> Vec<AxisId> {
        bound.iter().map(|axis| axis.id()).collect()
    }
}

impl std::fmt::Debug for SynchronizationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynchronizationGroup")
            .field("id", &self.id)
            .field("axes", &self.axes())
            .finish()
    }
}
