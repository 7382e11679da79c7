//! Axis driver trait and error types.
//!
//! This module defines:
//! - `AxisDriver` trait - Interface for pluggable axis backends
//! - `HalError` enum - Error types for backend and fleet operations
//! - `DriverFactory` type alias - Factory function type

use stage_common::config::ConfigError;
use stage_common::hal::axis::AxisHandle;
use stage_common::hal::channel::SharedChannel;
use stage_common::hal::config::AxisSettings;
use stage_common::hal::types::AxisId;
use thiserror::Error;

/// Error types for backend and fleet operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Axis id not present in the fleet
    #[error("Unknown axis: {0}")]
    UnknownAxis(AxisId),
}

impl From<ConfigError> for HalError {
    fn from(err: ConfigError) -> Self {
        HalError::ConfigError(err.to_string())
    }
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn AxisDriver>;

/// Trait defining the interface for axis backends.
///
/// A driver turns validated [`AxisSettings`] into live axes and opens the
/// controller channel those axes are reached through.
///
/// # Lifecycle
///
/// 1. `open_channel()` - Called once when the fleet is built
/// 2. `create_axis()` - Called once per configured axis
///
/// Both run before any motion is commanded and may block on hardware.
pub trait AxisDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Open the shared controller channel.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if the controller cannot be reached.
    fn open_channel(&mut self) -> Result<SharedChannel, HalError>;

    /// Create one axis from its settings.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if the drive does not answer.
    fn create_axis(&mut self, settings: &AxisSettings) -> Result<AxisHandle, HalError>;
}
