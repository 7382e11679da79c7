//! Simulated controller channel.
//!
//! Accepts every command and records it, so tests can assert the exact
//! traffic a caller produced. A channel can be told to reject commands to
//! exercise failure paths.

use parking_lot::Mutex;
use stage_common::hal::channel::{ChannelError, ControllerChannel, SharedChannel};
use stage_common::hal::types::GroupId;
use std::sync::Arc;
use tracing::trace;

/// One recorded controller command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCommand {
    /// `select_broadcast()`
    SelectBroadcast,
    /// `select_group(n)`
    SelectGroup(GroupId),
    /// `execute(program)`
    Execute(String),
    /// `set_long_variable(name, value)`
    SetLongVariable(String, i32),
    /// `call_label(label)`
    CallLabel(String),
}

/// Recording controller channel.
#[derive(Debug, Default)]
pub struct SimChannel {
    traffic: Vec<ChannelCommand>,
    reject: Option<String>,
}

impl SimChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel wrapped in its lock, keeping the concrete type visible.
    pub fn shared() -> Arc<Mutex<SimChannel>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Every command received so far, in order.
    pub fn traffic(&self) -> &[ChannelCommand] {
        &self.traffic
    }

    /// Forget recorded traffic.
    pub fn clear(&mut self) {
        self.traffic.clear();
    }

    /// Reject all further commands with `reason` (`None` accepts again).
    pub fn set_reject(&mut self, reason: Option<String>) {
        self.reject = reason;
    }

    fn accept(&mut self, command: ChannelCommand) -> Result<(), ChannelError> {
        if let Some(reason) = &self.reject {
            return Err(ChannelError::Rejected(reason.clone()));
        }
        trace!("sim channel: {:?}", command);
        self.traffic.push(command);
        Ok(())
    }
}

impl ControllerChannel for SimChannel {
    fn select_broadcast(&mut self) -> Result<(), ChannelError> {
        self.accept(ChannelCommand::SelectBroadcast)
    }

    fn select_group(&mut self, group: GroupId) -> Result<(), ChannelError> {
        self.accept(ChannelCommand::SelectGroup(group))
    }

    fn execute(&mut self, program: &str) -> Result<(), ChannelError> {
        self.accept(ChannelCommand::Execute(program.to_string()))
    }

    fn set_long_variable(&mut self, name: &str, value: i32) -> Result<(), ChannelError> {
        self.accept(ChannelCommand::SetLongVariable(name.to_string(), value))
    }

    fn call_label(&mut self, label: &str) -> Result<(), ChannelError> {
        self.accept(ChannelCommand::CallLabel(label.to_string()))
    }
}

/// Erase a shared simulated channel to the trait-object form callers expect.
pub fn into_shared(channel: Arc<Mutex<SimChannel>>) -> SharedChannel {
    channel
}
