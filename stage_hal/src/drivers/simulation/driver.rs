//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `AxisDriver` trait by handing out
//! [`SimAxis`] instances and one shared [`SimChannel`].

use super::axis::SimAxis;
use super::channel::{SimChannel, into_shared};
use crate::driver::{AxisDriver, HalError};
use parking_lot::Mutex;
use stage_common::hal::axis::AxisHandle;
use stage_common::hal::channel::SharedChannel;
use stage_common::hal::config::AxisSettings;
use std::sync::Arc;
use tracing::info;

/// Simulation driver implementing the AxisDriver trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Channel shared by every axis of this driver (opened lazily)
    channel: Option<Arc<Mutex<SimChannel>>>,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            channel: None,
        }
    }

    /// The concrete simulated channel, once opened.
    pub fn sim_channel(&self) -> Option<Arc<Mutex<SimChannel>>> {
        self.channel.clone()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn open_channel(&mut self) -> Result<SharedChannel, HalError> {
        let channel = self.channel.get_or_insert_with(SimChannel::shared).clone();
        info!("Simulation channel open");
        Ok(into_shared(channel))
    }

    fn create_axis(&mut self, settings: &AxisSettings) -> Result<AxisHandle, HalError> {
        settings.validate()?;
        info!(
            "Simulated axis {} '{}' travel {:.3}..{:.3}",
            settings.id, settings.name, settings.min_limit, settings.max_limit
        );
        Ok(Arc::new(SimAxis::new(settings.clone())))
    }
}
