//! Stage Common Library
//!
//! Shared identifiers, the axis capability set and configuration loading
//! used by every crate of the stage workspace.
//!
//! # Module Structure
//!
//! - [`hal`] - Axis capability set, controller channel, axis settings and constants
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use stage_common::prelude::*;
//!
//! let id = AxisId(3);
//! assert_eq!(id.to_string(), "3");
//! assert_eq!(GroupId::new(1).map(GroupId::get), Some(1));
//! ```

pub mod config;
pub mod hal;
pub mod prelude;
