use core::{cell::RefCell, fmt};
use std::rc::Weak;

use crate::{raw_pool::Core, InstanceId, PoolError, Poolable};

/// A non-owning reference from a pooled instance back to its pool.
///
/// Handed to [`Poolable::init`] so that an instance can recycle itself. The
/// link never keeps the pool alive; once the pool is dropped or destroyed,
/// every operation on the link fails with [`PoolError::PoolDestroyed`].
pub struct PoolLink<T: Poolable> {
    core: Weak<RefCell<Core<T>>>,
    id: InstanceId,
}

impl<T: Poolable> PoolLink<T> {
    pub(crate) fn new(core: Weak<RefCell<Core<T>>>, id: InstanceId) -> Self {
        Self { core, id }
    }

    /// Identity of the instance this link was issued to.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the instance to its pool.
    ///
    /// May be called from inside one of the instance's own methods. While the
    /// instance is borrowed the recycle stays pending, and it completes at the
    /// next pool operation after the borrow ends.
    ///
    /// # Panics
    ///
    /// Panics if called from a [`Poolable`] callback of the same pool.
    pub fn recycle(&self) -> Result<(), PoolError> {
        let shared = self.core.upgrade().ok_or(PoolError::PoolDestroyed)?;
        let mut core = shared.borrow_mut();
        core.recycle(self.id)
    }

    /// Whether the pool behind this link is still alive and not destroyed.
    pub fn is_attached(&self) -> bool {
        self.core
            .upgrade()
            .is_some_and(|shared| shared.try_borrow().map_or(true, |core| !core.is_destroyed()))
    }
}

impl<T: Poolable> Clone for PoolLink<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            id: self.id,
        }
    }
}

impl<T: Poolable> fmt::Debug for PoolLink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolLink")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}
