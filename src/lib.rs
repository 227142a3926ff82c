#![doc = include_str!("../README.md")]
#![warn(missing_docs, missing_debug_implementations)]
mod error;
mod generator;
mod link;
mod listeners;
mod placement;
mod pool;
mod poolable;
mod pooled;
mod raw_pool;

pub use error::*;
pub use generator::*;
pub use link::*;
pub use listeners::*;
pub use placement::*;
pub use pool::*;
pub use poolable::*;
pub use pooled::*;
pub use raw_pool::{PoolState, RawPool};
