//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (field
/// validation and stock rules). Store failures belong to the repository layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. blank code).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A withdrawal asked for more units than the lot holds.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { available: u32, requested: u32 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn insufficient_stock(available: u32, requested: u32) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }
}
