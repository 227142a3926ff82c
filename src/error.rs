use std::borrow::Cow;

use thiserror::Error;

use crate::InstanceId;

/// Errors returned by pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has been destroyed. Nothing can be acquired from or recycled
    /// into it anymore.
    #[error("the pool has been destroyed")]
    PoolDestroyed,

    /// The instance was not created by this pool.
    #[error("instance {id} did not originate from this pool")]
    ForeignInstance {
        /// The rejected instance.
        id: InstanceId,
    },

    /// The instance is already resting in the pool.
    #[error("instance {id} is already available in the pool")]
    AlreadyAvailable {
        /// The rejected instance.
        id: InstanceId,
    },

    /// The pooled type and the construction path do not match.
    #[error("invalid binding for `{type_name}`: {reason}")]
    InvalidBinding {
        /// Name of the pooled type.
        type_name: &'static str,
        /// What was wrong with the binding.
        reason: &'static str,
    },

    /// The generator could not produce a new instance.
    #[error(transparent)]
    GeneratorFailure(#[from] GeneratorError),

    /// The pool has not been initialized yet.
    #[error("the pool has not been initialized")]
    NotInitialized,

    /// The pool was already initialized.
    #[error("the pool is already initialized")]
    AlreadyInitialized,
}

/// Error raised by a [`Generator`](crate::Generator) that cannot produce an
/// instance.
#[derive(Debug, Error)]
#[error("failed to create an instance of `{type_name}`: {reason}")]
pub struct GeneratorError {
    type_name: &'static str,
    reason: Cow<'static, str>,
}

impl GeneratorError {
    /// Creates a new error for the type `T`.
    pub fn new<T>(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Name of the type that could not be created.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Why the instance could not be created.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
