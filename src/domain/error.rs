//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid injection vocabulary.
/// These are independent of any concrete tree or container.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid kind pattern '{pattern}': {message}")]
    InvalidKindPattern { pattern: String, message: String },
}

/// Result type for domain layer operations.
pub type DomainResult<T> = Result<T, DomainError>;
