//! # Stage HAL Library
//!
//! Axis backends with a pluggable driver architecture.
//!
//! Drivers implement the [`AxisDriver`](driver::AxisDriver) trait and hand
//! out handles implementing `stage_common::hal::axis::Axis`. The motion
//! cores never see a concrete backend.
//!
//! # Module Structure
//!
//! - [`driver`] - `AxisDriver` trait and `HalError`
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations (simulation)
//! - [`fleet`] - `AxisFleet`, built from `fleet.toml`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        stage_hal                             │
//! │  ┌──────────────┐    ┌──────────────┐    ┌────────────────┐  │
//! │  │  fleet.toml  │───►│  AxisFleet   │◄──►│ DriverRegistry │  │
//! │  └──────────────┘    └──────┬───────┘    └────────────────┘  │
//! │                             │                                │
//! │                 ┌───────────┴───────────┐                    │
//! │                 ▼                       ▼                    │
//! │          AxisHandle (×N)         SharedChannel               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver;
pub mod driver_registry;
pub mod drivers;
pub mod fleet;

pub use crate::driver::{AxisDriver, HalError};
pub use crate::driver_registry::DriverRegistry;
pub use crate::fleet::{AxisFleet, FleetConfig};
