//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DomainError, TransactionStatus};

/// Inventory record for one title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl Book {
    /// Copies currently out on loan
    pub fn issued_copies(&self) -> i32 {
        self.total_copies - self.available_copies
    }
}

/// Filter criteria for book queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Only titles with at least one copy on the shelf
    pub available_only: bool,
}

/// Input for creating a book
#[derive(Debug, Clone)]
pub struct CreateBookInput {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: i32,
}

/// Input for updating a book. `None` leaves the field untouched.
#[derive(Debug, Default, Clone)]
pub struct UpdateBookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<Option<String>>,
    pub total_copies: Option<i32>,
}

/// Repository trait for the book inventory
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter, ordered by title
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Create a new book with every copy available
    async fn create(&self, input: CreateBookInput) -> Result<Book, DomainError>;

    /// Update a book. A new total shifts the available count by the same
    /// delta and is rejected when it would drop below the issued copies.
    async fn update(&self, id: i32, input: UpdateBookInput) -> Result<Book, DomainError>;
}

/// One borrow-to-return cycle for one copy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    /// Current author and ISBN of the book, absent if the record is gone
    pub book_author: Option<String>,
    pub book_isbn: Option<String>,
    pub borrower_id: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub fine: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Filter criteria for ledger queries
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub borrower_id: Option<String>,
}

/// A loan about to be opened
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub book_id: i32,
    pub borrower_id: String,
    pub borrowed_at: DateTime<Utc>,
}

/// Outcome recorded when a loan is closed
#[derive(Debug, Clone)]
pub struct LoanClosure {
    pub returned_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub fine: f64,
}

/// Repository trait for the transaction ledger.
///
/// `open` and `close` touch both the ledger and the inventory; an
/// implementation must apply both writes atomically.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Find ledger entries, newest borrow first
    async fn find_all(&self, filter: TransactionFilter) -> Result<Vec<LedgerEntry>, DomainError>;

    /// Find a ledger entry by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<LedgerEntry>, DomainError>;

    /// Reserve one copy of the book and open a `borrowed` entry.
    ///
    /// Fails with `NotFound` for an unknown book and `Unavailable` when no
    /// copy is left; neither case writes anything.
    async fn open(&self, loan: NewLoan) -> Result<LedgerEntry, DomainError>;

    /// Close a `borrowed` entry and put its copy back on the shelf.
    ///
    /// Fails with `NotFound` for an unknown entry and `AlreadyReturned` when
    /// the entry is no longer open.
    async fn close(&self, id: i32, closure: LoanClosure) -> Result<LedgerEntry, DomainError>;

    /// Overwrite the stored fine
    async fn set_fine(&self, id: i32, fine: f64) -> Result<LedgerEntry, DomainError>;
}
