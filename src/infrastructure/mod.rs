//! Infrastructure layer: tree boundary, providers, and the reference arena
//!
//! This layer hosts the traits external collaborators implement and the
//! in-crate reference implementations used by tests and small embedders.

pub mod arena;
pub mod container;
pub mod traits;

pub use container::{ProviderError, ResolveContext, ScopedContainer, ValueProvider};
pub use traits::{ActivityTree, SlotError};
