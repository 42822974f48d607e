//! Book inventory handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use super::error::ApiError;
use super::extract::{AppJson, AppPath, AppQuery};
use crate::domain::{BookFilter, CreateBookInput, UpdateBookInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{Claims, LIBRARY_STAFF};
use crate::services::inventory_service;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBooksQuery {
    /// Only titles with a copy on the shelf
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub isbn: Option<Option<String>>,
    pub total_copies: Option<i32>,
}

// Distinguishes an absent `isbn` (leave alone) from `"isbn": null` (clear it)
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

#[utoipa::path(
    get,
    path = "/api/library/books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Books ordered by title"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    _claims: Claims,
    AppQuery(query): AppQuery<ListBooksQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = BookFilter {
        available_only: query.available.unwrap_or(false),
    };
    let books = inventory_service::list_books(state.book_repo.as_ref(), filter).await?;

    Ok(Json(json!({
        "books": books,
        "total": books.len()
    })))
}

#[utoipa::path(
    post,
    path = "/api/library/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book added with every copy available"),
        (status = 400, description = "Missing title/author or negative copy count"),
        (status = 403, description = "Caller is not library staff")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    claims: Claims,
    AppJson(payload): AppJson<CreateBookRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let input = CreateBookInput {
        title: payload.title,
        author: payload.author,
        isbn: payload.isbn,
        total_copies: payload.total_copies,
    };
    let book = inventory_service::create_book(state.book_repo.as_ref(), input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book created successfully",
            "book": book
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/library/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    _claims: Claims,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Value>, ApiError> {
    let book = inventory_service::get_book(state.book_repo.as_ref(), id).await?;
    Ok(Json(json!({ "book": book })))
}

#[utoipa::path(
    put,
    path = "/api/library/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Total below the copies currently issued"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    claims: Claims,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateBookRequest>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let input = UpdateBookInput {
        title: payload.title,
        author: payload.author,
        isbn: payload.isbn,
        total_copies: payload.total_copies,
    };
    let book = inventory_service::update_book(state.book_repo.as_ref(), id, input).await?;

    Ok(Json(json!({
        "message": "Book updated successfully",
        "book": book
    })))
}
