//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::{flatten_transaction_error, format_timestamp};
use crate::domain::{
    Book, BookFilter, BookRepository, CreateBookInput, DomainError, UpdateBookInput,
};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError> {
        let mut query = BookEntity::find();

        if filter.available_only {
            query = query.filter(Column::AvailableCopies.gt(0));
        }

        let books = query
            .order_by_asc(Column::Title)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(Book::from))
    }

    async fn create(&self, input: CreateBookInput) -> Result<Book, DomainError> {
        let now = format_timestamp(chrono::Utc::now());

        let new_book = ActiveModel {
            title: Set(input.title),
            author: Set(input.author),
            isbn: Set(input.isbn),
            total_copies: Set(input.total_copies),
            available_copies: Set(input.total_copies),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_book.insert(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn update(&self, id: i32, input: UpdateBookInput) -> Result<Book, DomainError> {
        let now = format_timestamp(chrono::Utc::now());

        self.db
            .transaction::<_, Book, DomainError>(move |txn| {
                Box::pin(async move {
                    let existing = BookEntity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(DomainError::NotFound("Book"))?;

                    if let Some(total) = input.total_copies {
                        let issued = existing.total_copies - existing.available_copies;
                        if total < issued {
                            return Err(DomainError::InvalidInput(format!(
                                "totalCopies cannot be lower than the {} copies currently issued",
                                issued
                            )));
                        }

                        // Shift availability by the same delta in one statement so a
                        // concurrent issue or return cannot slip in between.
                        let resized = BookEntity::update_many()
                            .col_expr(
                                Column::AvailableCopies,
                                Expr::cust_with_values(
                                    "available_copies + ? - total_copies",
                                    [total],
                                ),
                            )
                            .col_expr(Column::TotalCopies, Expr::value(total))
                            .col_expr(Column::UpdatedAt, Expr::value(now.clone()))
                            .filter(Column::Id.eq(id))
                            .filter(Expr::cust_with_values(
                                "total_copies - available_copies <= ?",
                                [total],
                            ))
                            .exec(txn)
                            .await?;

                        if resized.rows_affected == 0 {
                            return Err(DomainError::InvalidInput(
                                "totalCopies cannot be lower than the copies currently issued"
                                    .to_string(),
                            ));
                        }
                    }

                    let mut active: ActiveModel = existing.into();
                    let mut changed = false;

                    if let Some(title) = input.title {
                        active.title = Set(title);
                        changed = true;
                    }
                    if let Some(author) = input.author {
                        active.author = Set(author);
                        changed = true;
                    }
                    if let Some(isbn) = input.isbn {
                        active.isbn = Set(isbn);
                        changed = true;
                    }

                    if changed {
                        active.updated_at = Set(now);
                        active.update(txn).await?;
                    }

                    let updated = BookEntity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(DomainError::NotFound("Book"))?;

                    Ok(Book::from(updated))
                })
            })
            .await
            .map_err(flatten_transaction_error)
    }
}
