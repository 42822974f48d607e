//! Repository implementations using SeaORM

pub mod book_repository;
pub mod ledger_repository;

pub use book_repository::SeaOrmBookRepository;
pub use ledger_repository::SeaOrmLedgerRepository;

use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::TransactionError;

use crate::domain::DomainError;

/// Fixed-width UTC timestamp so stored values sort lexicographically.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| DomainError::Internal(format!("Corrupt timestamp '{}': {}", raw, e)))
}

pub(crate) fn flatten_transaction_error(e: TransactionError<DomainError>) -> DomainError {
    match e {
        TransactionError::Connection(db_err) => db_err.into(),
        TransactionError::Transaction(domain_err) => domain_err,
    }
}
