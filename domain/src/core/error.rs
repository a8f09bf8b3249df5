//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid backend id: {0}")]
    InvalidBackend(String),

    #[error("Illegal workflow transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },
}
