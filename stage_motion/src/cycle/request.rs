//! Cycle requests.

use crate::error::CycleError;
use serde::{Deserialize, Serialize};
use stage_common::hal::axis::AxisHandle;
use stage_common::hal::types::AxisId;
use std::time::Duration;

/// Run mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleOptions {
    /// Visit every ordered pair of distinct positions instead of the list itself.
    pub permute: bool,
    /// Pause after each non-blocking move, in seconds.
    pub delay_s: f64,
    /// Log every axis's position for each visited target.
    pub datalog: bool,
    /// Replay the sequence until stopped or faulted.
    pub repeat: bool,
}

impl CycleOptions {
    /// Inter-move delay, or `None` if `delay_s` is negative, not finite or
    /// too large for a [`Duration`].
    pub fn delay(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.delay_s).ok()
    }
}

/// Validated, immutable description of one run.
#[derive(Clone)]
pub struct CycleRequest {
    axes: Vec<AxisHandle>,
    positions: Vec<f64>,
    options: CycleOptions,
    delay: Duration,
}

impl CycleRequest {
    /// Build a request.
    ///
    /// # Errors
    /// `CycleError::InvalidRequest` if a position is not finite or the delay
    /// is not a representable number of seconds >= 0.
    pub fn new(
        axes: Vec<AxisHandle>,
        positions: Vec<f64>,
        options: CycleOptions,
    ) -> Result<Self, CycleError> {
        let Some(delay) = options.delay() else {
            return Err(CycleError::InvalidRequest(format!(
                "delay must be a finite number of seconds >= 0, got {}",
                options.delay_s
            )));
        };
        if let Some((index, bad)) = positions.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(CycleError::InvalidRequest(format!(
                "position #{index} is not a finite number: {bad}"
            )));
        }

        Ok(Self {
            axes,
            positions,
            options,
            delay,
        })
    }

    /// Axes in move order.
    pub fn axes(&self) -> &[AxisHandle] {
        &self.axes
    }

    /// Ids of the axes in move order.
    pub fn axis_ids(&self) -> Vec<AxisId> {
        self.axes.iter().map(|axis| axis.id()).collect()
    }

    /// Target positions as given.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Mode flags.
    pub fn options(&self) -> &CycleOptions {
        &self.options
    }

    /// Pause after each non-blocking move.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl std::fmt::Debug for CycleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleRequest")
            .field("axes", &self.axis_ids())
            .field("positions", &self.positions)
            .field("options", &self.options)
            .finish()
    }
}

/// Parse an operator-entered position.
///
/// # Errors
/// `CycleError::InvalidRequest` for text that is not a finite number.
pub fn parse_position(text: &str) -> Result<f64, CycleError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CycleError::InvalidRequest(format!(
            "'{text}' is not a valid position"
        ))),
    }
}
