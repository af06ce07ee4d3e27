//! Application layer: binding resolution and injection passes
//!
//! This layer orchestrates domain data against the tree boundary traits.

pub mod condition;
pub mod error;
pub mod registry;
pub mod services;

pub use error::{InjectionError, InjectionResult};
pub use registry::{Binding, BindingMatch, BindingRegistry};
