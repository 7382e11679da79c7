//! Axis capability set, controller channel and axis settings.
//!
//! Everything the motion cores need to know about an axis lives here; the
//! backends that implement it (simulation or hardware) live in `stage_hal`.

pub mod axis;
pub mod channel;
pub mod config;
pub mod consts;
pub mod types;
