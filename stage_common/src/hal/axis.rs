//! The axis capability set.
//!
//! [`Axis`] is what the group pool and the cycle engine consume. Backends
//! (simulated or drive-backed) implement it with interior mutability so a
//! single [`AxisHandle`] can be shared between callers.

use crate::hal::channel::ChannelError;
use crate::hal::types::{AxisFaults, AxisId, GroupId, MoveWait};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by axis operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    /// Commanded position lies outside the configured travel.
    #[error("axis {axis}: cannot move to {commanded:.3} because it is past the travel limit of {limit:.3}")]
    TravelLimit {
        /// Offending axis.
        axis: AxisId,
        /// Position that was commanded.
        commanded: f64,
        /// Limit that would have been crossed.
        limit: f64,
    },

    /// Datalog buffer is full.
    #[error("axis {axis}: position log exceeded its capacity of {capacity} samples")]
    LoggingOverflow {
        /// Offending axis.
        axis: AxisId,
        /// Buffer capacity in samples.
        capacity: usize,
    },

    /// `wait_for_logging_complete` without a prior `start_logging`.
    #[error("axis {0}: position logging was not started")]
    LoggingNotStarted(AxisId),

    /// The position log could not be written.
    #[error("axis {axis}: failed to write position log {path:?}: {reason}")]
    LogWrite {
        /// Offending axis.
        axis: AxisId,
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        reason: String,
    },

    /// Channel traffic on behalf of the axis failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Any other drive-reported fault.
    #[error("axis {axis}: {reason}")]
    Fault {
        /// Offending axis.
        axis: AxisId,
        /// Drive-reported reason.
        reason: String,
    },
}

/// Capability set of one motorized axis.
pub trait Axis: Send + Sync {
    /// Controller-assigned identifier.
    fn id(&self) -> AxisId;

    /// Display name.
    fn name(&self) -> String;

    /// Move to an absolute position in engineering units.
    fn move_absolute(&self, position: f64, wait: MoveWait) -> Result<(), AxisError>;

    /// Move by `delta` engineering units from the current position.
    fn move_relative(&self, delta: f64, wait: MoveWait) -> Result<(), AxisError> {
        self.move_absolute(self.position() + delta, wait)
    }

    /// Current position in engineering units.
    fn position(&self) -> f64;

    /// Whether the last commanded move has finished.
    fn is_move_complete(&self) -> bool;

    /// Add the axis to a synchronization group.
    fn add_to_group(&self, group: GroupId) -> Result<(), AxisError>;

    /// Remove the axis from a synchronization group.
    fn remove_from_group(&self, group: GroupId) -> Result<(), AxisError>;

    /// Groups the axis currently belongs to.
    fn groups(&self) -> Vec<GroupId>;

    /// Arm the drive-side position log.
    fn start_logging(&self) -> Result<(), AxisError>;

    /// Block until the position log is flushed to `path` (overwritten).
    fn wait_for_logging_complete(&self, path: &Path) -> Result<(), AxisError>;

    /// Latched faults.
    fn faults(&self) -> AxisFaults;

    /// Clear latched faults.
    fn reset_faults(&self);
}

/// Shared reference to an axis.
pub type AxisHandle = Arc<dyn Axis>;
