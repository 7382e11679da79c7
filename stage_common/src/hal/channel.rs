//! Controller communication channel.
//!
//! Group configuration goes to the motor controller as raw channel traffic
//! rather than per-axis calls. The link is not reentrant, so every user
//! shares one [`SharedChannel`] and holds its lock for the whole exchange.

use crate::hal::types::GroupId;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a controller channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// The controller refused the command.
    #[error("controller rejected command: {0}")]
    Rejected(String),

    /// The link to the controller failed.
    #[error("controller communication error: {0}")]
    Communication(String),
}

/// Primitives used to address and program synchronization groups.
pub trait ControllerChannel: Send {
    /// Address every drive on the link.
    fn select_broadcast(&mut self) -> Result<(), ChannelError>;

    /// Address the drives bound to `group`.
    fn select_group(&mut self, group: GroupId) -> Result<(), ChannelError>;

    /// Execute a controller program on the current destination.
    fn execute(&mut self, program: &str) -> Result<(), ChannelError>;

    /// Write a 32-bit drive variable on the current destination.
    fn set_long_variable(&mut self, name: &str, value: i32) -> Result<(), ChannelError>;

    /// Call a drive-side procedure by label on the current destination.
    fn call_label(&mut self, label: &str) -> Result<(), ChannelError>;
}

/// Channel plus the lock serializing access to it.
pub type SharedChannel = Arc<Mutex<dyn ControllerChannel>>;
