use core::{any::type_name, fmt};

use tracing::debug;

use crate::{
    Container, DefaultGenerator, Generator, InstanceId, Placement, PoolError, PoolState,
    Poolable, Pooled, PrototypeGenerator, RawPool, AUTO_CONTAINER_POSITION,
};

/// Options for pools of template-bound types.
#[derive(Clone, Debug, Default)]
pub struct HostOptions {
    /// Container resting instances are parented to. When absent, one is
    /// created at [`AUTO_CONTAINER_POSITION`].
    pub container: Option<Container>,
    /// Hides the automatically created container from host listings. Has no
    /// functional effect.
    pub hide_in_listing: bool,
}

/// A pool bound to one poolable type.
///
/// The construction path decides how instances are produced and is checked
/// right away: plain types go through [`Pool::new`], template-bound types
/// through [`Pool::from_template`]. [`Pool::with_generator`] accepts a custom
/// generator for plain types.
///
/// # Examples
///
/// ```
/// use recycle_pool::{Pool, Poolable};
///
/// #[derive(Default)]
/// struct Particle {
///     ttl: u32,
/// }
///
/// impl Poolable for Particle {
///     fn on_allocate(&mut self) {
///         self.ttl = 60;
///     }
///
///     fn on_deallocate(&mut self) {
///         self.ttl = 0;
///     }
///
///     fn destroy(&mut self) {}
/// }
///
/// let pool = Pool::<Particle>::new(2).unwrap();
/// let particle = pool.acquire().unwrap();
/// assert_eq!(particle.borrow().ttl, 60);
///
/// pool.recycle(&particle).unwrap();
/// assert_eq!(pool.available_count(), 2);
/// ```
pub struct Pool<T: Poolable> {
    raw: RawPool<T>,
    container: Option<Container>,
}

impl<T: Poolable + Default> Pool<T> {
    /// Creates a pool of `initial_size` default-constructed instances.
    ///
    /// Fails with [`PoolError::InvalidBinding`] if `T` must be cloned from a
    /// template.
    pub fn new(initial_size: usize) -> Result<Self, PoolError> {
        if T::TEMPLATE_BOUND {
            return Err(invalid_binding::<T>(
                "template-bound types must be pooled from a template",
            ));
        }
        Self::build(initial_size, DefaultGenerator::new(), None)
    }
}

impl<T: Poolable + Placement + Clone> Pool<T> {
    /// Creates a pool of `initial_size` clones of `template`.
    ///
    /// Resting instances are parented to the container from `options`, or to
    /// a new one. Handed out instances are detached with an identity
    /// transform.
    ///
    /// Fails with [`PoolError::InvalidBinding`] if `T` is not template-bound
    /// or if no template is given.
    pub fn from_template(
        initial_size: usize,
        template: Option<T>,
        options: HostOptions,
    ) -> Result<Self, PoolError> {
        if !T::TEMPLATE_BOUND {
            return Err(invalid_binding::<T>(
                "only template-bound types can be pooled from a template",
            ));
        }
        let Some(template) = template else {
            return Err(invalid_binding::<T>("a template is required"));
        };

        let container = options.container.unwrap_or_else(|| {
            Container::new(format!("{} Pool", short_type_name::<T>()))
                .with_position(AUTO_CONTAINER_POSITION)
                .with_hidden(options.hide_in_listing)
        });
        let generator = PrototypeGenerator::new(template, container.clone());
        Self::build(initial_size, generator, Some(container))
    }
}

impl<T: Poolable> Pool<T> {
    /// Creates a pool of `initial_size` instances produced by `generator`.
    ///
    /// Fails with [`PoolError::InvalidBinding`] if `T` must be cloned from a
    /// template or if `generator` clones one; use [`Pool::from_template`] for
    /// those.
    pub fn with_generator(
        initial_size: usize,
        generator: impl Generator<T> + 'static,
    ) -> Result<Self, PoolError> {
        if T::TEMPLATE_BOUND {
            return Err(invalid_binding::<T>(
                "template-bound types must be pooled from a template",
            ));
        }
        if generator.clones_template() {
            return Err(invalid_binding::<T>(
                "template generators are only accepted through from_template",
            ));
        }
        Self::build(initial_size, generator, None)
    }

    fn build(
        initial_size: usize,
        generator: impl Generator<T> + 'static,
        container: Option<Container>,
    ) -> Result<Self, PoolError> {
        let raw = RawPool::new(generator);
        raw.initialize(initial_size)?;
        Ok(Pool { raw, container })
    }

    /// Hands out an instance, creating one if none is resting.
    pub fn acquire(&self) -> Result<Pooled<T>, PoolError> {
        self.raw.acquire()
    }

    /// Returns an instance to the pool.
    ///
    /// Fails with [`PoolError::ForeignInstance`] if the instance came from
    /// another pool and with [`PoolError::AlreadyAvailable`] if it is already
    /// resting here. A borrowed instance is recycled once the borrow ends, see
    /// [`RawPool::recycle`].
    pub fn recycle(&self, obj: &Pooled<T>) -> Result<(), PoolError> {
        self.raw.recycle(obj)
    }

    /// Returns the instance with the given id to the pool.
    ///
    /// Behaves like [`Self::recycle`], including for borrowed instances.
    pub fn recycle_id(&self, id: InstanceId) -> Result<(), PoolError> {
        self.raw.recycle_id(id)
    }

    /// Recycles every handed out instance and returns how many there were.
    pub fn recycle_all(&self) -> Result<usize, PoolError> {
        self.raw.recycle_all()
    }

    /// Destroys the pool along with every instance it created.
    pub fn destroy(&self) -> Result<(), PoolError> {
        self.raw.destroy()
    }

    /// Destroys the pool and its resting instances, orphaning handed out ones.
    pub fn destroy_available(&self) -> Result<(), PoolError> {
        self.raw.destroy_available()
    }

    /// Number of instances owned by the pool.
    pub fn size(&self) -> usize {
        self.raw.size()
    }

    /// Number of instances resting in the pool.
    pub fn available_count(&self) -> usize {
        self.raw.available_count()
    }

    /// Number of instances currently handed out.
    pub fn allocated_count(&self) -> usize {
        self.raw.allocated_count()
    }

    /// Current lifecycle stage.
    pub fn state(&self) -> PoolState {
        self.raw.state()
    }

    /// Container resting instances are parented to, for template-bound pools.
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// The underlying engine.
    pub fn as_raw(&self) -> &RawPool<T> {
        &self.raw
    }
}

impl<T: Poolable> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("raw", &self.raw)
            .field("container", &self.container)
            .finish()
    }
}

fn invalid_binding<T>(reason: &'static str) -> PoolError {
    debug!(pool = type_name::<T>(), reason, "invalid pool binding");
    PoolError::InvalidBinding {
        type_name: type_name::<T>(),
        reason,
    }
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
