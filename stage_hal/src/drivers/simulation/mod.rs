//! Simulation driver module.
//!
//! Software-emulated axes and controller channel for development and
//! testing without a motor controller attached.

mod axis;
mod channel;
mod datalog;
mod driver;

pub use axis::SimAxis;
pub use channel::{ChannelCommand, SimChannel, into_shared};
pub use datalog::{LogFull, LogSample, PositionLog, write_log_file};
pub use driver::SimulationDriver;

use crate::driver::AxisDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn AxisDriver> {
    Box::new(SimulationDriver::new())
}
