//! Domain layer: injection vocabulary and pass outcome data
//!
//! This layer is independent of external concerns (no tree access, no providers).

pub mod entities;
pub mod error;
pub mod report;

pub use entities::{BindingPrecedence, CapabilityId, InjectionMarker};
pub use error::{DomainError, DomainResult};
pub use report::{FailureKind, InjectionFailure, InjectionReport};
