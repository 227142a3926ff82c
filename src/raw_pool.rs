use core::{any::type_name, cell::RefCell, fmt, mem};
use std::{
    collections::{HashMap, VecDeque},
    rc::{Rc, Weak},
};

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::{Generator, InstanceId, PoolError, PoolLink, Poolable, Pooled};

/// Lifecycle stage of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolState {
    /// Created but not filled yet.
    Uninitialized,
    /// Serving acquire and recycle calls.
    Active,
    /// Torn down for good.
    Destroyed,
}

/// The allocation engine behind every pool.
///
/// Owns every instance it created and tracks which ones are resting in the
/// pool and which ones are handed out. Resting instances are reused in FIFO
/// order: the one recycled longest ago is handed out first. When none is
/// resting, the generator creates one more.
///
/// The pool is single threaded and not reentrant: calling back into the same
/// pool from a [`Poolable`] callback panics.
///
/// An instance may recycle itself from one of its own methods, i.e. while it
/// is mutably borrowed. Such a recycle is accepted right away and completes at
/// the next pool operation after the borrow ends.
pub struct RawPool<T: Poolable> {
    core: Rc<RefCell<Core<T>>>,
}

impl<T: Poolable> RawPool<T> {
    /// Creates an uninitialized pool that produces instances with `generator`.
    pub fn new(generator: impl Generator<T> + 'static) -> Self {
        let core = Rc::new_cyclic(|this| {
            RefCell::new(Core {
                this: this.clone(),
                generator: Box::new(generator),
                state: State::Uninitialized,
            })
        });
        RawPool { core }
    }

    /// Fills the pool with `initial_size` fresh instances.
    ///
    /// Either every instance is created or, if the generator fails, none is
    /// kept and the pool stays uninitialized.
    pub fn initialize(&self, initial_size: usize) -> Result<(), PoolError> {
        self.core.borrow_mut().initialize(initial_size)
    }

    /// Hands out the resting instance that was recycled longest ago.
    ///
    /// If no instance is resting, exactly one new instance is created first.
    ///
    /// # Panics
    ///
    /// Panics if the instance to hand out is still borrowed through a handle
    /// kept from before it was recycled.
    pub fn acquire(&self) -> Result<Pooled<T>, PoolError> {
        self.core.borrow_mut().acquire()
    }

    /// Returns a handed out instance to the pool.
    ///
    /// If the instance is currently borrowed, the recycle is recorded and
    /// completes at the next pool operation after the borrow ends. Until then
    /// the instance still counts as handed out, and recycling it again fails
    /// with [`PoolError::AlreadyAvailable`].
    pub fn recycle(&self, obj: &Pooled<T>) -> Result<(), PoolError> {
        self.recycle_id(obj.id())
    }

    /// Returns the handed out instance with the given id to the pool.
    ///
    /// Borrowed instances are recycled lazily, as with [`Self::recycle`].
    pub fn recycle_id(&self, id: InstanceId) -> Result<(), PoolError> {
        self.core.borrow_mut().recycle(id)
    }

    /// Recycles every handed out instance and returns how many there were.
    ///
    /// Instances with a recycle already in flight are not counted again.
    pub fn recycle_all(&self) -> Result<usize, PoolError> {
        self.core.borrow_mut().recycle_all()
    }

    /// Tears the pool down, destroying every instance it ever created.
    ///
    /// Handed out instances get `on_deallocate` before `destroy`.
    ///
    /// # Panics
    ///
    /// Panics if a handed out instance is still borrowed.
    pub fn destroy(&self) -> Result<(), PoolError> {
        self.core.borrow_mut().destroy(true)
    }

    /// Tears the pool down, destroying only the resting instances.
    ///
    /// Handed out instances are orphaned: the pool forgets them and their
    /// cleanup becomes the holder's business.
    pub fn destroy_available(&self) -> Result<(), PoolError> {
        self.core.borrow_mut().destroy(false)
    }

    /// Number of instances owned by the pool.
    pub fn size(&self) -> usize {
        self.core.borrow().size()
    }

    /// Number of instances resting in the pool.
    pub fn available_count(&self) -> usize {
        let mut core = self.core.borrow_mut();
        core.flush_pending();
        core.available_count()
    }

    /// Number of instances currently handed out.
    pub fn allocated_count(&self) -> usize {
        let mut core = self.core.borrow_mut();
        core.flush_pending();
        core.allocated_count()
    }

    /// Current lifecycle stage.
    pub fn state(&self) -> PoolState {
        self.core.borrow().state()
    }

    /// Checks if the pool has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.core.borrow().is_destroyed()
    }

    /// Checks if `obj` was created by this pool and is still owned by it.
    pub fn contains(&self, obj: &Pooled<T>) -> bool {
        match &self.core.borrow().state {
            State::Active(slots) => slots.universe.contains_key(&obj.id()),
            _ => false,
        }
    }
}

impl<T: Poolable> Drop for RawPool<T> {
    fn drop(&mut self) {
        // An abandoned pool still releases what it holds; holders keep theirs.
        if let Ok(mut core) = self.core.try_borrow_mut() {
            if core.state() == PoolState::Active {
                let _ = core.destroy(false);
            }
        }
    }
}

impl<T: Poolable> fmt::Debug for RawPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => fmt::Debug::fmt(&*core, f),
            Err(_) => f.write_str("RawPool { <busy> }"),
        }
    }
}

pub(crate) struct Core<T: Poolable> {
    this: Weak<RefCell<Core<T>>>,
    generator: Box<dyn Generator<T>>,
    state: State<T>,
}

enum State<T> {
    Uninitialized,
    Active(Slots<T>),
    Destroyed,
}

impl<T> State<T> {
    fn active_mut(&mut self) -> Result<&mut Slots<T>, PoolError> {
        match self {
            State::Active(slots) => Ok(slots),
            State::Uninitialized => Err(PoolError::NotInitialized),
            State::Destroyed => Err(PoolError::PoolDestroyed),
        }
    }
}

type Shared<T> = Rc<RefCell<T>>;

/// Every owned instance lives in `universe` and in exactly one of `available`
/// or `allocated`. `pending` holds the allocated ids whose recycle waits for a
/// borrow to end, in request order.
struct Slots<T> {
    universe: HashMap<InstanceId, Shared<T>>,
    available: VecDeque<(InstanceId, Shared<T>)>,
    allocated: IndexSet<InstanceId>,
    pending: IndexSet<InstanceId>,
}

impl<T> Slots<T> {
    fn with_capacity(capacity: usize) -> Self {
        Slots {
            universe: HashMap::with_capacity(capacity),
            available: VecDeque::with_capacity(capacity),
            allocated: IndexSet::with_capacity(capacity),
            pending: IndexSet::new(),
        }
    }

    fn admit(&mut self, id: InstanceId, obj: Shared<T>) {
        self.universe.insert(id, Rc::clone(&obj));
        self.available.push_back((id, obj));
    }
}

/// Creates one instance and runs its `init`.
fn spawn<T: Poolable>(
    generator: &dyn Generator<T>,
    this: &Weak<RefCell<Core<T>>>,
) -> Result<(InstanceId, Shared<T>), PoolError> {
    let mut obj = generator.create_instance()?;
    let id = InstanceId::next();
    obj.init(PoolLink::new(this.clone(), id));
    Ok((id, Rc::new(RefCell::new(obj))))
}

/// Moves an allocated instance back to `available`, unless it is borrowed.
///
/// Collections are only touched once the callbacks returned.
fn settle<T: Poolable>(
    generator: &dyn Generator<T>,
    slots: &mut Slots<T>,
    id: InstanceId,
    obj: Shared<T>,
) -> bool {
    {
        let Ok(mut guard) = obj.try_borrow_mut() else {
            return false;
        };
        guard.on_deallocate();
        generator.restore(&mut guard);
    }
    slots.allocated.shift_remove(&id);
    slots.pending.shift_remove(&id);
    slots.available.push_back((id, obj));
    trace!(pool = type_name::<T>(), %id, available = slots.available.len(), "recycled");
    true
}

impl<T: Poolable> Core<T> {
    fn initialize(&mut self, initial_size: usize) -> Result<(), PoolError> {
        match self.state {
            State::Uninitialized => {}
            State::Active(_) => return Err(PoolError::AlreadyInitialized),
            State::Destroyed => return Err(PoolError::PoolDestroyed),
        }

        let mut slots = Slots::with_capacity(initial_size);
        for _ in 0..initial_size {
            match spawn(&*self.generator, &self.this) {
                Ok((id, obj)) => slots.admit(id, obj),
                Err(err) => {
                    debug!(
                        pool = type_name::<T>(),
                        created = slots.universe.len(),
                        %err,
                        "pool initialization failed"
                    );
                    for (_, obj) in slots.available {
                        obj.borrow_mut().destroy();
                    }
                    return Err(err);
                }
            }
        }

        debug!(pool = type_name::<T>(), size = initial_size, "pool initialized");
        self.state = State::Active(slots);
        Ok(())
    }

    fn acquire(&mut self) -> Result<Pooled<T>, PoolError> {
        let Core {
            this,
            generator,
            state,
        } = self;
        let slots = state.active_mut()?;
        Self::settle_pending(&**generator, slots);

        let (id, obj) = match slots.available.pop_front() {
            Some(entry) => entry,
            None => {
                let (id, obj) = spawn(&**generator, this)?;
                slots.universe.insert(id, Rc::clone(&obj));
                trace!(pool = type_name::<T>(), size = slots.universe.len(), "pool grew");
                (id, obj)
            }
        };

        slots.allocated.insert(id);
        {
            let mut guard = obj.borrow_mut();
            guard.on_allocate();
            generator.prepare(&mut guard);
        }
        trace!(pool = type_name::<T>(), %id, available = slots.available.len(), "acquired");

        Ok(Pooled::new(id, obj, PoolLink::new(this.clone(), id)))
    }

    pub(crate) fn recycle(&mut self, id: InstanceId) -> Result<(), PoolError> {
        let Core {
            generator, state, ..
        } = self;
        let slots = state.active_mut()?;
        Self::settle_pending(&**generator, slots);

        let obj = match slots.universe.get(&id) {
            Some(obj) => Rc::clone(obj),
            None => return Err(PoolError::ForeignInstance { id }),
        };
        if !slots.allocated.contains(&id) || slots.pending.contains(&id) {
            return Err(PoolError::AlreadyAvailable { id });
        }

        if !settle(&**generator, slots, id, obj) {
            slots.pending.insert(id);
            trace!(pool = type_name::<T>(), %id, "recycle deferred");
        }
        Ok(())
    }

    fn recycle_all(&mut self) -> Result<usize, PoolError> {
        let Core {
            generator, state, ..
        } = self;
        let slots = state.active_mut()?;
        Self::settle_pending(&**generator, slots);

        // Recycling mutates the allocated set, so walk a snapshot.
        let allocated: Vec<InstanceId> = slots
            .allocated
            .iter()
            .filter(|id| !slots.pending.contains(*id))
            .copied()
            .collect();
        for &id in &allocated {
            if let Some(obj) = slots.universe.get(&id).cloned() {
                if !settle(&**generator, slots, id, obj) {
                    slots.pending.insert(id);
                }
            }
        }
        Ok(allocated.len())
    }

    /// Completes the recycles that were waiting for a borrow to end.
    fn flush_pending(&mut self) {
        let Core {
            generator, state, ..
        } = self;
        if let State::Active(slots) = state {
            Self::settle_pending(&**generator, slots);
        }
    }

    fn settle_pending(generator: &dyn Generator<T>, slots: &mut Slots<T>) {
        if slots.pending.is_empty() {
            return;
        }
        let pending: Vec<InstanceId> = slots.pending.iter().copied().collect();
        for id in pending {
            if let Some(obj) = slots.universe.get(&id).cloned() {
                settle(generator, slots, id, obj);
            }
        }
    }

    fn destroy(&mut self, destroy_allocated: bool) -> Result<(), PoolError> {
        self.flush_pending();
        let slots = match mem::replace(&mut self.state, State::Destroyed) {
            State::Active(slots) => slots,
            State::Uninitialized => {
                debug!(pool = type_name::<T>(), "uninitialized pool destroyed");
                return Ok(());
            }
            State::Destroyed => return Err(PoolError::PoolDestroyed),
        };

        let Slots {
            universe,
            available,
            allocated,
            ..
        } = slots;

        if destroy_allocated {
            for obj in allocated.iter().filter_map(|id| universe.get(id)) {
                let mut guard = obj.borrow_mut();
                guard.on_deallocate();
                guard.destroy();
            }
        }
        for (_, obj) in &available {
            obj.borrow_mut().destroy();
        }

        debug!(
            pool = type_name::<T>(),
            destroyed = if destroy_allocated { universe.len() } else { available.len() },
            orphaned = if destroy_allocated { 0 } else { allocated.len() },
            "pool destroyed"
        );
        Ok(())
    }

    fn size(&self) -> usize {
        match &self.state {
            State::Active(slots) => slots.universe.len(),
            _ => 0,
        }
    }

    fn available_count(&self) -> usize {
        match &self.state {
            State::Active(slots) => slots.available.len(),
            _ => 0,
        }
    }

    fn allocated_count(&self) -> usize {
        match &self.state {
            State::Active(slots) => slots.allocated.len(),
            _ => 0,
        }
    }

    fn state(&self) -> PoolState {
        match self.state {
            State::Uninitialized => PoolState::Uninitialized,
            State::Active(_) => PoolState::Active,
            State::Destroyed => PoolState::Destroyed,
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        matches!(self.state, State::Destroyed)
    }
}

impl<T: Poolable> fmt::Debug for Core<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPool")
            .field("type", &type_name::<T>())
            .field("state", &self.state())
            .field("size", &self.size())
            .field("available", &self.available_count())
            .finish()
    }
}
