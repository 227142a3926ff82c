use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::PoolLink;

/// A trait defining the lifecycle contract of a pooled type.
///
/// The pool drives every instance through `init` once, then any number of
/// `on_allocate`/`on_deallocate` pairs, and finally `destroy` at most once.
pub trait Poolable: Sized + 'static {
    /// Whether instances must be cloned from a template instead of being
    /// constructed from scratch.
    ///
    /// Template-bound types can only be pooled through
    /// [`Pool::from_template`](crate::Pool::from_template), and other types
    /// never can.
    const TEMPLATE_BOUND: bool = false;

    /// Called exactly once, right after the instance was created and before it
    /// is ever handed out.
    ///
    /// The link lets the instance recycle itself later on. It does not keep
    /// the pool alive.
    fn init(&mut self, _owner: PoolLink<Self>) {}

    /// Called every time the instance is handed out by the pool.
    fn on_allocate(&mut self);

    /// Called every time the instance is returned to the pool.
    fn on_deallocate(&mut self);

    /// Called when the pool releases the instance for good. No further
    /// callbacks follow.
    fn destroy(&mut self);
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pooled instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
