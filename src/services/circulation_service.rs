//! Circulation Service - issue, return and fine bookkeeping without HTTP layer

use chrono::{DateTime, Utc};

use crate::domain::{
    DomainError, FineAssessment, FinePolicy, LedgerEntry, LedgerRepository, LoanClosure, NewLoan,
    TransactionFilter,
};

/// Request to lend one copy of a book
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub book_id: i32,
    pub borrower_id: String,
}

/// Closed ledger entry together with the fine computed for it
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    pub transaction: LedgerEntry,
    pub assessment: FineAssessment,
}

/// Lend a copy: reserves one copy and opens a `borrowed` entry stamped `now`.
pub async fn issue_book(
    ledger: &dyn LedgerRepository,
    request: IssueRequest,
    now: DateTime<Utc>,
) -> Result<LedgerEntry, DomainError> {
    let borrower_id = request.borrower_id.trim();
    if borrower_id.is_empty() {
        return Err(DomainError::InvalidInput(
            "Borrower ID is required".to_string(),
        ));
    }

    let result = ledger
        .open(NewLoan {
            book_id: request.book_id,
            borrower_id: borrower_id.to_string(),
            borrowed_at: now,
        })
        .await;

    match &result {
        Ok(entry) => tracing::info!(
            "Issued book {} to {} (transaction {})",
            entry.book_id,
            entry.borrower_id,
            entry.id
        ),
        Err(e) if e.is_user_facing() => {
            tracing::warn!("Issue of book {} refused: {}", request.book_id, e)
        }
        Err(e) => tracing::error!("Issue of book {} failed: {}", request.book_id, e),
    }

    result
}

/// Close an open entry at `now`, charging the policy fine when overdue.
pub async fn return_book(
    ledger: &dyn LedgerRepository,
    policy: &FinePolicy,
    transaction_id: i32,
    now: DateTime<Utc>,
) -> Result<ReturnOutcome, DomainError> {
    let entry = ledger
        .find_by_id(transaction_id)
        .await?
        .ok_or(DomainError::NotFound("Transaction"))?;

    if entry.status.is_closed() {
        tracing::warn!("Transaction {} already closed", transaction_id);
        return Err(DomainError::AlreadyReturned);
    }

    let assessment = policy.assess(entry.borrow_date, now);

    let transaction = ledger
        .close(
            transaction_id,
            LoanClosure {
                returned_at: now,
                status: assessment.closing_status(),
                fine: assessment.fine,
            },
        )
        .await?;

    tracing::info!(
        "Transaction {} closed as {} after {} days (fine {})",
        transaction.id,
        transaction.status,
        assessment.days_elapsed,
        assessment.fine
    );

    Ok(ReturnOutcome {
        transaction,
        assessment,
    })
}

/// What the borrower owes, without touching the ledger.
///
/// Open entries are assessed at `now`; closed entries at their return date,
/// so the answer stays stable after the book is back.
pub async fn quote_fine(
    ledger: &dyn LedgerRepository,
    policy: &FinePolicy,
    transaction_id: i32,
    now: DateTime<Utc>,
) -> Result<FineAssessment, DomainError> {
    let entry = ledger
        .find_by_id(transaction_id)
        .await?
        .ok_or(DomainError::NotFound("Transaction"))?;

    let at = entry.return_date.unwrap_or(now);
    Ok(policy.assess(entry.borrow_date, at))
}

/// Administrative correction of the stored fine. Status is left as is.
pub async fn override_fine(
    ledger: &dyn LedgerRepository,
    transaction_id: i32,
    fine: Option<f64>,
) -> Result<LedgerEntry, DomainError> {
    let fine = match fine {
        Some(f) if f.is_finite() && f >= 0.0 => f,
        _ => {
            return Err(DomainError::InvalidInput(
                "Valid fine amount is required".to_string(),
            ));
        }
    };

    let entry = ledger.set_fine(transaction_id, fine).await?;
    tracing::info!("Fine on transaction {} set to {}", entry.id, entry.fine);
    Ok(entry)
}

pub async fn get_transaction(
    ledger: &dyn LedgerRepository,
    transaction_id: i32,
) -> Result<LedgerEntry, DomainError> {
    ledger
        .find_by_id(transaction_id)
        .await?
        .ok_or(DomainError::NotFound("Transaction"))
}

pub async fn list_transactions(
    ledger: &dyn LedgerRepository,
    filter: TransactionFilter,
) -> Result<Vec<LedgerEntry>, DomainError> {
    ledger.find_all(filter).await
}

/// Every entry for one borrower, newest first
pub async fn borrower_transactions(
    ledger: &dyn LedgerRepository,
    borrower_id: &str,
) -> Result<Vec<LedgerEntry>, DomainError> {
    ledger
        .find_all(TransactionFilter {
            status: None,
            borrower_id: Some(borrower_id.to_string()),
        })
        .await
}
