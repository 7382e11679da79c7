//! # Stage Motion
//!
//! Coordination cores for a multi-axis stage:
//!
//! - [`group`]: a pool of the controller's synchronization group slots,
//!   handed out lowest-first with a bounded poll-and-sleep wait
//! - [`cycle`]: a cancellable background engine driving axes through an
//!   (optionally permuted) position sequence
//!
//! Both take axes as [`AxisHandle`](stage_common::hal::axis::AxisHandle)s
//! built by `stage_hal`; neither owns global state.
//!
//! ```no_run
//! use stage_hal::{AxisFleet, DriverRegistry};
//! use stage_motion::cycle::{CycleEngine, CycleOptions, CycleRequest};
//! use stage_common::hal::types::AxisId;
//! use std::path::Path;
//!
//! let config = AxisFleet::load_config(Path::new("fleet.toml")).unwrap();
//! let fleet = AxisFleet::build(config, &DriverRegistry::with_builtin_drivers()).unwrap();
//! let axes = fleet.resolve(&[AxisId(1), AxisId(2)]).unwrap();
//!
//! let engine = CycleEngine::new(fleet.log_dir());
//! let request = CycleRequest::new(axes, vec![10.0, 20.0], CycleOptions::default()).unwrap();
//! engine.start(request).unwrap();
//! let outcome = engine.wait();
//! ```

pub mod cycle;
pub mod error;
pub mod group;

pub use cycle::{CycleEngine, CycleOptions, CycleRequest, RunOutcome};
pub use error::{CycleError, GroupError};
pub use group::{GroupLease, GroupPool, SynchronizationGroup};
