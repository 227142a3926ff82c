use std::{
    borrow::Cow,
    sync::atomic::{AtomicU64, Ordering},
};

/// Position where automatically created containers are placed, far away from
/// anything the host cares about.
pub const AUTO_CONTAINER_POSITION: [f32; 3] = [-9999.0, -9999.0, -9999.0];

/// Local placement of a hosted instance relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub position: [f32; 3],
    /// Rotation as an `[x, y, z, w]` quaternion.
    pub rotation: [f32; 4],
    /// Per-axis scale.
    pub scale: [f32; 3],
}

impl Transform {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: [0.0; 3],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0; 3],
    };

    /// Identity transform moved to `position`.
    pub const fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

/// A placement context that resting pool instances are parented to.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    id: ContainerId,
    name: Cow<'static, str>,
    transform: Transform,
    hidden: bool,
}

impl Container {
    /// Creates a visible container at the origin.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            transform: Transform::IDENTITY,
            hidden: false,
        }
    }

    /// Moves the container to `position`.
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.transform.position = position;
        self
    }

    /// Marks the container as hidden from host listings. Purely cosmetic.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Identity of the container.
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Display name of the container.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placement of the container itself.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Whether the container is hidden from host listings.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// A trait for instances that live inside a host hierarchy and can be
/// re-parented.
///
/// Template-bound pools use it to keep resting instances inside the pool
/// container and to detach instances that are handed out.
pub trait Placement {
    /// Parents the instance to `parent`, or detaches it when `None`.
    fn set_parent(&mut self, parent: Option<&Container>);

    /// Mutable access to the local transform of the instance.
    fn local_transform_mut(&mut self) -> &mut Transform;
}
