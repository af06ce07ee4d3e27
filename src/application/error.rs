//! Application-level errors (wraps domain errors)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::report::InjectionFailure;

/// Application errors wrap domain errors and carry the collected outcome
/// of a failed resolution pass.
#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The pass ran to completion but recorded failures. All of them are
    /// carried so one run surfaces every misconfiguration.
    #[error("injection pass failed with {} failure(s): {}", failures.len(), failures.iter().map(ToString::to_string).join("; "))]
    Pass { failures: Vec<InjectionFailure> },
}

impl InjectionError {
    /// The failures recorded during the pass, empty for non-pass errors.
    pub fn failures(&self) -> &[InjectionFailure] {
        match self {
            InjectionError::Pass { failures } => failures,
            InjectionError::Domain(_) => &[],
        }
    }
}

/// Result type for application layer operations.
pub type InjectionResult<T> = Result<T, InjectionError>;
