//! Fixed pool of synchronization groups.
//!
//! The controller offers [`MAX_GROUPS`] group slots. A caller acquires one
//! for a set of axes, uses it, and releases it. When every slot is taken,
//! `acquire` polls every [`GROUP_POLL_INTERVAL`] until one frees up or the
//! timeout runs out.
//!
//! A slot moves `Free -> InUse` on acquire and `InUse -> Releasing -> Free`
//! on release. Only the release that flips `InUse` to `Releasing` talks to
//! the controller.

use super::sync_group::SynchronizationGroup;
use crate::error::GroupError;
use parking_lot::Mutex;
use stage_common::hal::axis::AxisHandle;
use stage_common::hal::channel::SharedChannel;
use stage_common::hal::consts::{GROUP_POLL_INTERVAL, MAX_GROUPS};
use stage_common::hal::types::GroupId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    InUse,
    Releasing,
}

/// Pool of the controller's synchronization group slots.
pub struct GroupPool {
    groups: Vec<Arc<SynchronizationGroup>>,
    slots: Mutex<[Slot; MAX_GROUPS]>,
    poll_interval: Duration,
}

impl GroupPool {
    /// Create a pool with every slot free.
    pub fn new(channel: SharedChannel) -> Self {
        Self::with_poll_interval(channel, GROUP_POLL_INTERVAL)
    }

    /// Create a pool polling at `poll_interval` while exhausted.
    pub fn with_poll_interval(channel: SharedChannel, poll_interval: Duration) -> Self {
        let groups = GroupId::all()
            .map(|id| Arc::new(SynchronizationGroup::new(id, channel.clone())))
            .collect();
        Self {
            groups,
            slots: Mutex::new([Slot::Free; MAX_GROUPS]),
            poll_interval,
        }
    }

    /// Take the lowest-numbered free slot and bind `axes` to it.
    ///
    /// A zero `timeout` tries exactly once. If binding fails the slot is
    /// returned to the pool before the error is reported.
    ///
    /// # Errors
    /// `GroupError::ResourceExhausted` if no slot freed up in time, or the
    /// channel/axis error raised while binding.
    pub fn acquire(
        &self,
        axes: &[AxisHandle],
        timeout: Duration,
    ) -> Result<Arc<SynchronizationGroup>, GroupError> {
        let deadline = Instant::now() + timeout;

        let index = loop {
            if let Some(index) = self.take_lowest_free() {
                break index;
            }
            let now = Instant::now();
            if now >= deadline {
                warn!("No synchronization group free after {:?}", timeout);
                return Err(GroupError::ResourceExhausted { timeout });
            }
            std::thread::sleep(self.poll_interval.min(deadline - now));
        };

        let group = self.groups[index].clone();
        if let Err(e) = group.bind(axes) {
            warn!("group {}: bind failed: {}", group.number(), e);
            self.slots.lock()[index] = Slot::Free;
            return Err(e);
        }

        info!("Acquired group {} for axes {:?}", group.number(), group.axes());
        Ok(group)
    }

    /// Unbind `group` and return its slot to the pool.
    ///
    /// Releasing a free slot, or one another caller is already releasing,
    /// only logs a warning. The slot is marked free even if the controller
    /// rejects the unbind; the error is still returned.
    ///
    /// # Errors
    /// `GroupError::UnknownGroup` if `group` does not belong to this pool,
    /// or the unbind error.
    pub fn release(&self, group: &SynchronizationGroup) -> Result<(), GroupError> {
        let index = self.index_of(group)?;

        {
            let mut slots = self.slots.lock();
            if slots[index] != Slot::InUse {
                warn!("group {}: released while not in use", group.number());
                return Ok(());
            }
            slots[index] = Slot::Releasing;
        }

        let result = group.unbind();
        self.slots.lock()[index] = Slot::Free;
        debug!("Released group {}", group.number());
        result
    }

    /// Unbind every group and mark all slots free.
    ///
    /// Every slot is processed; the first error is reported.
    pub fn release_all(&self) -> Result<(), GroupError> {
        let mut first_error = None;
        for (index, group) in self.groups.iter().enumerate() {
            if let Err(e) = group.unbind() {
                warn!("group {}: unbind failed: {}", group.number(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            self.slots.lock()[index] = Slot::Free;
        }
        info!("Released all synchronization groups");
        first_error.map_or(Ok(()), Err)
    }

    /// Number of free slots.
    pub fn available_count(&self) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|slot| **slot == Slot::Free)
            .count()
    }

    /// Guard that resets the pool when dropped; see [`GroupLease`].
    pub fn lease(&self) -> GroupLease<'_> {
        GroupLease {
            pool: self,
            group: None,
        }
    }

    fn take_lowest_free(&self) -> Option<usize> {
        let mut slots = self.slots.lock();
        let index = slots.iter().position(|slot| *slot == Slot::Free)?;
        slots[index] = Slot::InUse;
        Some(index)
    }

    fn index_of(&self, group: &SynchronizationGroup) -> Result<usize, GroupError> {
        let index = usize::from(group.number().get()) - 1;
        match self.groups.get(index) {
            Some(own) if std::ptr::eq(own.as_ref(), group) => Ok(index),
            _ => Err(GroupError::UnknownGroup(group.number())),
        }
    }
}

/// Scope over a [`GroupPool`] that undoes its bindings on every exit path.
///
/// On drop the group taken through [`GroupLease::acquire`] (if any) is
/// released, then every slot is reset with [`GroupPool::release_all`].
/// Failures are logged.
pub struct GroupLease<'a> {
    pool: &'a GroupPool,
    group: Option<Arc<SynchronizationGroup>>,
}

impl GroupLease<'_> {
    /// Acquire a group through the pool and hold it until the lease drops.
    ///
    /// # Errors
    /// As [`GroupPool::acquire`].
    pub fn acquire(
        &mut self,
        axes: &[AxisHandle],
        timeout: Duration,
    ) -> Result<Arc<SynchronizationGroup>, GroupError> {
        let group = self.pool.acquire(axes, timeout)?;
        if let Some(previous) = self.group.replace(group.clone()) {
            if let Err(e) = self.pool.release(&previous) {
                warn!("Failed to release group {}: {}", previous.number(), e);
            }
        }
        Ok(group)
    }

    /// The held group.
    pub fn group(&self) -> Option<&Arc<SynchronizationGroup>> {
        self.group.as_ref()
    }
}

impl Drop for GroupLease<'_> {
    fn drop(&mut self) {
        if let Some(group) = self.group.take() {
            if let Err(e) = self.pool.release(&group) {
                warn!("Failed to release group {}: {}", group.number(), e);
            }
        }
        if let Err(e) = self.pool.release_all() {
            warn!("Failed to reset synchronization groups: {}", e);
        }
    }
}

impl std::fmt::Debug for GroupPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupPool")
            .field("available", &self.available_count())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_hal::drivers::simulation::{SimChannel, into_shared};

    fn pool() -> GroupPool {
        GroupPool::new(into_shared(SimChannel::shared()))
    }

    #[test]
    fn test_lowest_slot_first() {
        let pool = pool();
        let g1 = pool.acquire(&[], Duration::ZERO).unwrap();
        let g2 = pool.acquire(&[], Duration::ZERO).unwrap();
        assert_eq!((g1.number().get(), g2.number().get()), (1, 2));

        pool.release(&g1).unwrap();
        let again = pool.acquire(&[], Duration::ZERO).unwrap();
        assert_eq!(again.number().get(), 1);
    }

    #[test]
    fn test_zero_timeout_fails_immediately_when_full() {
        let pool = pool();
        let _held: Vec<_> = (0..MAX_GROUPS)
            .map(|_| pool.acquire(&[], Duration::ZERO).unwrap())
            .collect();

        let start = Instant::now();
        let err = pool.acquire(&[], Duration::ZERO).unwrap_err();
        assert_eq!(err, GroupError::ResourceExhausted { timeout: Duration::ZERO });
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn test_release_while_releasing_is_ignored() {
        let pool = pool();
        let group = pool.acquire(&[], Duration::ZERO).unwrap();
        pool.slots.lock()[0] = Slot::Releasing;

        pool.release(&group).unwrap();
        assert_eq!(pool.slots.lock()[0], Slot::Releasing);
        assert_eq!(pool.available_count(), MAX_GROUPS - 1);
    }

    #[test]
    fn test_foreign_group_rejected() {
        let pool = pool();
        let other = GroupPool::new(into_shared(SimChannel::shared()));
        let foreign = other.acquire(&[], Duration::ZERO).unwrap();
        assert_eq!(
            pool.release(&foreign),
            Err(GroupError::UnknownGroup(foreign.number()))
        );
    }
}
