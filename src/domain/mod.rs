//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only trait definitions, circulation rules and domain error types.

pub mod circulation;
pub mod errors;
pub mod repositories;

pub use circulation::{FineAssessment, FinePolicy, TransactionStatus};
pub use errors::DomainError;
pub use repositories::*;
