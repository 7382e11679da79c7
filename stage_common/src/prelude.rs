//! Prelude module for common re-exports.
//!
//! ```rust
//! use stage_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Axis capability set ────────────────────────────────────────────
pub use crate::hal::axis::{Axis, AxisError, AxisHandle};
pub use crate::hal::channel::{ChannelError, ControllerChannel, SharedChannel};
pub use crate::hal::config::AxisSettings;
pub use crate::hal::types::{AxisFaults, AxisId, GroupId, MoveWait};

// ─── Controller constants ───────────────────────────────────────────
pub use crate::hal::consts::{GROUP_POLL_INTERVAL, MAX_GROUPS};
