use core::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    hash::{Hash, Hasher},
};
use std::rc::Rc;

use crate::{InstanceId, PoolError, PoolLink, Poolable};

/// A handle to an instance handed out by a pool.
///
/// Handles are cheap to clone and compare by instance identity. Holding a
/// handle does not keep the pool alive, but it does keep the instance alive,
/// which is how orphaned instances outlive their pool.
pub struct Pooled<T: Poolable> {
    id: InstanceId,
    obj: Rc<RefCell<T>>,
    link: PoolLink<T>,
}

impl<T: Poolable> Pooled<T> {
    pub(crate) fn new(id: InstanceId, obj: Rc<RefCell<T>>, link: PoolLink<T>) -> Self {
        Pooled { id, obj, link }
    }

    /// Identity of the instance.
    #[inline(always)]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Immutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    #[inline(always)]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.obj.borrow()
    }

    /// Mutably borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    #[inline(always)]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.obj.borrow_mut()
    }

    /// Returns the instance to the pool it came from.
    ///
    /// If the instance is borrowed at the time, the recycle completes at the
    /// next pool operation after the borrow ends.
    pub fn recycle(&self) -> Result<(), PoolError> {
        self.link.recycle()
    }

    /// Link back to the owning pool.
    pub fn link(&self) -> &PoolLink<T> {
        &self.link
    }
}

impl<T: Poolable> Clone for Pooled<T> {
    fn clone(&self) -> Self {
        Pooled {
            id: self.id,
            obj: Rc::clone(&self.obj),
            link: self.link.clone(),
        }
    }
}

impl<T: Poolable> PartialEq for Pooled<T> {
    #[inline]
    fn eq(&self, other: &Pooled<T>) -> bool {
        self.id == other.id
    }
}
impl<T: Poolable> Eq for Pooled<T> {}
impl<T: Poolable> Hash for Pooled<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl<T: Poolable + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Pooled");
        out.field("id", &self.id);
        match self.obj.try_borrow() {
            Ok(obj) => out.field("obj", &*obj),
            Err(_) => out.field("obj", &format_args!("<borrowed>")),
        };
        out.finish()
    }
}
impl<T: Poolable> fmt::Pointer for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.obj, f)
    }
}
