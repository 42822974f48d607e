//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Services work against the repository traits, so they run the same over
//! SeaORM or any other storage implementation.

pub mod circulation_service;
pub mod inventory_service;

// Re-export for convenience
pub use circulation_service::*;
pub use inventory_service::*;
