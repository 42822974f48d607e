//! SeaORM implementation of LedgerRepository
//!
//! Issue and return each touch two tables. Both writes run inside one
//! database transaction, and the inventory counter only ever moves through
//! conditional `UPDATE`s so concurrent requests cannot oversell a title.
//! Each transaction opens with its conditional write, which makes SQLite
//! take the write lock up front instead of upgrading a read snapshot.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::{flatten_transaction_error, format_timestamp, parse_timestamp};
use crate::domain::{
    DomainError, LedgerEntry, LedgerRepository, LoanClosure, NewLoan, TransactionFilter,
    TransactionStatus,
};
use crate::models::book::{self, Entity as BookEntity};
use crate::models::library_transaction::{ActiveModel, Column, Entity as TransactionEntity, Model};

/// SeaORM-based implementation of LedgerRepository
pub struct SeaOrmLedgerRepository {
    db: DatabaseConnection,
}

impl SeaOrmLedgerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_entry(model: Model, book: Option<book::Model>) -> Result<LedgerEntry, DomainError> {
    Ok(LedgerEntry {
        id: model.id,
        book_id: model.book_id,
        borrow_date: parse_timestamp(&model.borrow_date)?,
        return_date: model
            .return_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
        status: model
            .status
            .parse()
            .map_err(|_| DomainError::Internal(format!("Corrupt status '{}'", model.status)))?,
        book_title: model.book_title,
        book_author: book.as_ref().map(|b| b.author.clone()),
        book_isbn: book.and_then(|b| b.isbn),
        borrower_id: model.borrower_id,
        fine: model.fine,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

async fn find_with_book<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<(Model, Option<book::Model>)>, DomainError> {
    Ok(TransactionEntity::find_by_id(id)
        .find_also_related(BookEntity)
        .one(conn)
        .await?)
}

#[async_trait]
impl LedgerRepository for SeaOrmLedgerRepository {
    async fn find_all(&self, filter: TransactionFilter) -> Result<Vec<LedgerEntry>, DomainError> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(Column::Status.eq(status.as_str()));
        }

        if let Some(borrower_id) = filter.borrower_id {
            condition = condition.add(Column::BorrowerId.eq(borrower_id));
        }

        let transactions = TransactionEntity::find()
            .find_also_related(BookEntity)
            .filter(condition)
            .order_by_desc(Column::BorrowDate)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        transactions
            .into_iter()
            .map(|(entry, book)| to_entry(entry, book))
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<LedgerEntry>, DomainError> {
        find_with_book(&self.db, id)
            .await?
            .map(|(entry, book)| to_entry(entry, book))
            .transpose()
    }

    async fn open(&self, loan: NewLoan) -> Result<LedgerEntry, DomainError> {
        let now = format_timestamp(chrono::Utc::now());
        let borrow_date = format_timestamp(loan.borrowed_at);

        let (saved, book) = self
            .db
            .transaction::<_, (Model, book::Model), DomainError>(move |txn| {
                Box::pin(async move {
                    // 1. Reserve a copy only if one is on the shelf
                    let reserved = BookEntity::update_many()
                        .col_expr(
                            book::Column::AvailableCopies,
                            Expr::col(book::Column::AvailableCopies).sub(1),
                        )
                        .col_expr(book::Column::UpdatedAt, Expr::value(now.clone()))
                        .filter(book::Column::Id.eq(loan.book_id))
                        .filter(book::Column::AvailableCopies.gt(0))
                        .exec(txn)
                        .await?;

                    // 2. Nothing reserved: unknown book or empty shelf
                    let book = BookEntity::find_by_id(loan.book_id)
                        .one(txn)
                        .await?
                        .ok_or(DomainError::NotFound("Book"))?;

                    if reserved.rows_affected == 0 {
                        return Err(DomainError::Unavailable);
                    }

                    // 3. Open the ledger entry
                    let entry = ActiveModel {
                        book_id: Set(book.id),
                        book_title: Set(book.title.clone()),
                        borrower_id: Set(loan.borrower_id),
                        borrow_date: Set(borrow_date),
                        return_date: Set(None),
                        status: Set(TransactionStatus::Borrowed.as_str().to_owned()),
                        fine: Set(0.0),
                        created_at: Set(now.clone()),
                        updated_at: Set(now),
                        ..Default::default()
                    };

                    Ok((entry.insert(txn).await?, book))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        to_entry(saved, Some(book))
    }

    async fn close(&self, id: i32, closure: LoanClosure) -> Result<LedgerEntry, DomainError> {
        let now = format_timestamp(chrono::Utc::now());
        let returned_at = format_timestamp(closure.returned_at);

        let (saved, book) = self
            .db
            .transaction::<_, (Model, Option<book::Model>), DomainError>(move |txn| {
                Box::pin(async move {
                    // 1. Close the entry, but only while it is still open
                    let closed = TransactionEntity::update_many()
                        .col_expr(Column::ReturnDate, Expr::value(Some(returned_at)))
                        .col_expr(Column::Status, Expr::value(closure.status.as_str()))
                        .col_expr(Column::Fine, Expr::value(closure.fine))
                        .col_expr(Column::UpdatedAt, Expr::value(now.clone()))
                        .filter(Column::Id.eq(id))
                        .filter(Column::Status.eq(TransactionStatus::Borrowed.as_str()))
                        .exec(txn)
                        .await?;

                    let entry = TransactionEntity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(DomainError::NotFound("Transaction"))?;

                    if closed.rows_affected == 0 {
                        return Err(DomainError::AlreadyReturned);
                    }

                    // 2. Put the copy back, never past the total
                    let released = BookEntity::update_many()
                        .col_expr(
                            book::Column::AvailableCopies,
                            Expr::col(book::Column::AvailableCopies).add(1),
                        )
                        .col_expr(book::Column::UpdatedAt, Expr::value(now))
                        .filter(book::Column::Id.eq(entry.book_id))
                        .filter(
                            Expr::col(book::Column::AvailableCopies)
                                .lt(Expr::col(book::Column::TotalCopies)),
                        )
                        .exec(txn)
                        .await?;

                    if released.rows_affected == 0 {
                        tracing::warn!(
                            "Book {} missing or fully shelved; inventory unchanged for transaction {}",
                            entry.book_id,
                            id
                        );
                    }

                    find_with_book(txn, id)
                        .await?
                        .ok_or(DomainError::NotFound("Transaction"))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        to_entry(saved, book)
    }

    async fn set_fine(&self, id: i32, fine: f64) -> Result<LedgerEntry, DomainError> {
        let existing = TransactionEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Transaction"))?;

        let mut active: ActiveModel = existing.into();
        active.fine = Set(fine);
        active.updated_at = Set(format_timestamp(chrono::Utc::now()));

        let result = active.update(&self.db).await?;
        let book = result.find_related(BookEntity).one(&self.db).await?;
        to_entry(result, book)
    }
}
