//! Error types for the group pool and the cycle engine.

use stage_common::hal::axis::AxisError;
use stage_common::hal::channel::ChannelError;
use stage_common::hal::types::GroupId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`GroupPool`](crate::group::GroupPool) and
/// [`SynchronizationGroup`](crate::group::SynchronizationGroup).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupError {
    /// No group became available within the timeout.
    #[error("out of synchronization groups (waited {timeout:?})")]
    ResourceExhausted {
        /// How long the caller was willing to wait.
        timeout: Duration,
    },

    /// The group does not belong to this pool.
    #[error("group {0} does not belong to this pool")]
    UnknownGroup(GroupId),

    /// Group traffic on the controller channel failed.
    #[error("group channel error: {0}")]
    Channel(#[from] ChannelError),

    /// An axis refused a membership change.
    #[error("group membership error: {0}")]
    Axis(#[from] AxisError),
}

/// Errors returned by [`CycleEngine`](crate::cycle::CycleEngine) and
/// request construction.
///
/// Axis faults during a run are not errors of the caller's call; they end
/// the run and are reported through
/// [`RunOutcome::Faulted`](crate::cycle::RunOutcome::Faulted).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    /// The previous run's worker has not exited yet.
    #[error("a cycle run is already in progress")]
    AlreadyRunning,

    /// The request failed validation.
    #[error("invalid cycle request: {0}")]
    InvalidRequest(String),

    /// The position log directory could not be created.
    #[error("cannot create log directory {path:?}: {reason}")]
    LogDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        reason: String,
    },

    /// The worker thread could not be spawned.
    #[error("failed to spawn cycle worker: {0}")]
    Spawn(String),
}
