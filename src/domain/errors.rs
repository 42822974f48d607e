//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Book or transaction absent; carries the kind of record looked up
    NotFound(&'static str),
    /// No copies of the book are left on the shelf
    Unavailable,
    /// The ledger entry is already closed
    AlreadyReturned,
    /// Malformed or out-of-range input
    InvalidInput(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    /// True for failures the caller caused (4xx), false for storage trouble.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, DomainError::Database(_) | DomainError::Internal(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(what) => write!(f, "{} not found", what),
            DomainError::Unavailable => write!(f, "Book is not available"),
            DomainError::AlreadyReturned => write!(f, "Book already returned"),
            DomainError::InvalidInput(msg) => write!(f, "{}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
