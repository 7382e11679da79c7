//! Axis and group identifiers, move modes and fault flags.

use crate::hal::consts::MAX_GROUPS;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller-assigned axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisId(pub u8);

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hardware synchronization group number, always in `1..=MAX_GROUPS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u8);

impl GroupId {
    /// Returns `None` unless `number` is a valid group number.
    pub fn new(number: u8) -> Option<Self> {
        (1..=MAX_GROUPS as u8).contains(&number).then_some(Self(number))
    }

    /// Raw group number.
    pub fn get(self) -> u8 {
        self.0
    }

    /// All group numbers in ascending order.
    pub fn all() -> impl Iterator<Item = GroupId> {
        (1..=MAX_GROUPS as u8).map(GroupId)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a move call returns at once or after the target is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveWait {
    /// Issue the move and return immediately.
    NonBlocking,
    /// Return once the axis reports the move complete.
    Blocking,
}

bitflags! {
    /// Latched axis fault flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AxisFaults: u16 {
        /// Move commanded past the positive travel limit.
        const TRAVEL_LIMIT_POS = 0x0001;
        /// Move commanded past the negative travel limit.
        const TRAVEL_LIMIT_NEG = 0x0002;
        /// Datalog buffer capacity exceeded.
        const LOG_OVERFLOW     = 0x0004;
        /// Communication with the drive failed.
        const COMMUNICATION    = 0x0008;
    }
}

impl Default for AxisFaults {
    fn default() -> Self {
        Self::empty()
    }
}

impl AxisFaults {
    /// Human-readable names of the set flags.
    pub fn descriptions(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}
