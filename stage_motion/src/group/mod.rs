//! Synchronization groups.
//!
//! - [`SynchronizationGroup`]: one controller group slot (bind/unbind/enable)
//! - [`GroupPool`]: the fixed set of slots, handed out lowest-first
//! - [`GroupLease`]: scope that releases and resets the pool on drop

mod pool;
mod sync_group;

pub use pool::{GroupLease, GroupPool};
pub use sync_group::SynchronizationGroup;
