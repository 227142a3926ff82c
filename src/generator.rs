use core::{fmt, marker::PhantomData};

use crate::{Container, GeneratorError, Placement, Transform};

/// A trait defining how a pool produces new instances.
///
/// Besides creating instances, a generator may adjust an instance right after
/// it was handed out ([`Self::prepare`]) and right after it came back
/// ([`Self::restore`]).
pub trait Generator<T> {
    /// Creates a new, distinct instance of type T.
    fn create_instance(&self) -> Result<T, GeneratorError>;

    /// Adjusts an instance after its `on_allocate` callback ran.
    ///
    /// By default, this method does nothing.
    #[inline(always)]
    fn prepare(&self, _obj: &mut T) {}

    /// Adjusts an instance after its `on_deallocate` callback ran.
    ///
    /// By default, this method does nothing.
    #[inline(always)]
    fn restore(&self, _obj: &mut T) {}

    /// Whether instances are cloned from a template.
    ///
    /// Such generators only back pools built with `Pool::from_template`. By
    /// default, this method returns `false`.
    #[inline(always)]
    fn clones_template(&self) -> bool {
        false
    }
}

/// Generator that builds instances with [`Default::default`].
pub struct DefaultGenerator<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> DefaultGenerator<T> {
    /// Creates a new default generator.
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for DefaultGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> Generator<T> for DefaultGenerator<T> {
    #[inline(always)]
    fn create_instance(&self) -> Result<T, GeneratorError> {
        Ok(T::default())
    }
}

impl<T> fmt::Debug for DefaultGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultGenerator")
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Generator backed by a factory closure.
///
/// Use it for types without a [`Default`] implementation or whose creation
/// can fail.
pub struct FnGenerator<F> {
    factory: F,
}

impl<F> FnGenerator<F> {
    /// Wraps `factory` into a generator.
    pub fn new<T>(factory: F) -> Self
    where
        F: Fn() -> Result<T, GeneratorError>,
    {
        Self { factory }
    }
}

impl<T, F> Generator<T> for FnGenerator<F>
where
    F: Fn() -> Result<T, GeneratorError>,
{
    #[inline(always)]
    fn create_instance(&self) -> Result<T, GeneratorError> {
        (self.factory)()
    }
}

impl<F> fmt::Debug for FnGenerator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGenerator").finish_non_exhaustive()
    }
}

/// Generator that clones a template into a container.
///
/// New instances are parented to the container with their local position at
/// the origin. Handed out instances are detached with an identity transform,
/// and returned ones go back into the container.
#[derive(Debug)]
pub struct PrototypeGenerator<T> {
    template: T,
    container: Container,
}

impl<T> PrototypeGenerator<T> {
    /// Creates a generator cloning `template` into `container`.
    pub fn new(template: T, container: Container) -> Self {
        Self {
            template,
            container,
        }
    }

    /// The template every instance is cloned from.
    pub fn template(&self) -> &T {
        &self.template
    }

    /// The container resting instances are parented to.
    pub fn container(&self) -> &Container {
        &self.container
    }

    fn park(&self, obj: &mut T)
    where
        T: Placement,
    {
        obj.set_parent(Some(&self.container));
        obj.local_transform_mut().position = Transform::IDENTITY.position;
    }
}

impl<T: Placement + Clone> Generator<T> for PrototypeGenerator<T> {
    fn create_instance(&self) -> Result<T, GeneratorError> {
        let mut obj = self.template.clone();
        self.park(&mut obj);
        Ok(obj)
    }

    fn prepare(&self, obj: &mut T) {
        obj.set_parent(None);
        *obj.local_transform_mut() = Transform::IDENTITY;
    }

    fn restore(&self, obj: &mut T) {
        self.park(obj);
    }

    fn clones_template(&self) -> bool {
        true
    }
}
