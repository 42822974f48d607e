//! Inventory Service - book records and their copy counts

use crate::domain::{
    Book, BookFilter, BookRepository, CreateBookInput, DomainError, UpdateBookInput,
};

fn required(field: &str, value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn non_negative_copies(total: i32) -> Result<i32, DomainError> {
    if total < 0 {
        return Err(DomainError::InvalidInput(
            "totalCopies must not be negative".to_string(),
        ));
    }
    Ok(total)
}

pub async fn create_book(
    books: &dyn BookRepository,
    input: CreateBookInput,
) -> Result<Book, DomainError> {
    let input = CreateBookInput {
        title: required("title", input.title)?,
        author: required("author", input.author)?,
        isbn: input.isbn.filter(|s| !s.trim().is_empty()),
        total_copies: non_negative_copies(input.total_copies)?,
    };

    let book = books.create(input).await?;
    tracing::info!(
        "Added book {} '{}' with {} copies",
        book.id,
        book.title,
        book.total_copies
    );
    Ok(book)
}

pub async fn update_book(
    books: &dyn BookRepository,
    id: i32,
    input: UpdateBookInput,
) -> Result<Book, DomainError> {
    let input = UpdateBookInput {
        title: input.title.map(|t| required("title", t)).transpose()?,
        author: input.author.map(|a| required("author", a)).transpose()?,
        isbn: input
            .isbn
            .map(|isbn| isbn.filter(|s| !s.trim().is_empty())),
        total_copies: input.total_copies.map(non_negative_copies).transpose()?,
    };

    let book = books.update(id, input).await?;
    tracing::info!(
        "Updated book {}: {}/{} copies available",
        book.id,
        book.available_copies,
        book.total_copies
    );
    Ok(book)
}

pub async fn get_book(books: &dyn BookRepository, id: i32) -> Result<Book, DomainError> {
    books
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Book"))
}

pub async fn list_books(
    books: &dyn BookRepository,
    filter: BookFilter,
) -> Result<Vec<Book>, DomainError> {
    books.find_all(filter).await
}
