//! Circulation desk handlers: issue, return, fines and ledger listings

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use super::error::ApiError;
use super::extract::{AppJson, AppPath, AppQuery};
use crate::domain::circulation::format_fine;
use crate::domain::{DomainError, TransactionFilter, TransactionStatus};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{Claims, LIBRARY_STAFF, Role};
use crate::services::circulation_service::{self, IssueRequest};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueBookRequest {
    #[serde(alias = "bookID")]
    pub book_id: i32,
    #[serde(alias = "borrowedBy")]
    pub borrower_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBookRequest {
    pub transaction_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFineRequest {
    /// New fine, must be zero or more
    pub fine: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// `borrowed`, `returned` or `overdue`
    pub status: Option<String>,
    pub borrower_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/library/issue",
    request_body = IssueBookRequest,
    responses(
        (status = 201, description = "Book issued, ledger entry opened"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copy available")
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    claims: Claims,
    AppJson(payload): AppJson<IssueBookRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let request = IssueRequest {
        book_id: payload.book_id,
        borrower_id: payload.borrower_id,
    };
    let transaction =
        circulation_service::issue_book(state.ledger_repo.as_ref(), request, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book issued successfully",
            "transaction": transaction
        })),
    ))
}

async fn close_transaction(state: &AppState, transaction_id: i32) -> Result<Json<Value>, ApiError> {
    let outcome = circulation_service::return_book(
        state.ledger_repo.as_ref(),
        &state.fine_policy,
        transaction_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(json!({
        "message": "Book returned successfully",
        "transaction": outcome.transaction,
        "daysElapsed": outcome.assessment.days_elapsed,
        "fine": format_fine(outcome.assessment.fine, &state.currency)
    })))
}

#[utoipa::path(
    post,
    path = "/api/library/return",
    request_body = ReturnBookRequest,
    responses(
        (status = 200, description = "Book returned, fine computed"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    claims: Claims,
    AppJson(payload): AppJson<ReturnBookRequest>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;
    close_transaction(&state, payload.transaction_id).await
}

#[utoipa::path(
    put,
    path = "/api/library/return/{transaction_id}",
    params(("transaction_id" = i32, Path, description = "Ledger entry id")),
    responses(
        (status = 200, description = "Book returned, fine computed"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_book_by_id(
    State(state): State<AppState>,
    claims: Claims,
    AppPath(transaction_id): AppPath<i32>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;
    close_transaction(&state, transaction_id).await
}

#[utoipa::path(
    get,
    path = "/api/library/calculate-fine/{transaction_id}",
    params(("transaction_id" = i32, Path, description = "Ledger entry id")),
    responses(
        (status = 200, description = "Fine owed if returned now"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn calculate_fine(
    State(state): State<AppState>,
    claims: Claims,
    AppPath(transaction_id): AppPath<i32>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let assessment = circulation_service::quote_fine(
        state.ledger_repo.as_ref(),
        &state.fine_policy,
        transaction_id,
        Utc::now(),
    )
    .await?;

    let mut body = json!(assessment);
    body["fine"] = json!(format_fine(assessment.fine, &state.currency));
    Ok(Json(body))
}

#[utoipa::path(
    put,
    path = "/api/library/fine/{transaction_id}",
    params(("transaction_id" = i32, Path, description = "Ledger entry id")),
    request_body = UpdateFineRequest,
    responses(
        (status = 200, description = "Fine overwritten"),
        (status = 400, description = "Missing or negative fine"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn update_fine(
    State(state): State<AppState>,
    claims: Claims,
    AppPath(transaction_id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateFineRequest>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let transaction =
        circulation_service::override_fine(state.ledger_repo.as_ref(), transaction_id, payload.fine)
            .await?;

    Ok(Json(json!({
        "message": "Fine updated successfully",
        "transaction": transaction
    })))
}

#[utoipa::path(
    get,
    path = "/api/library/transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Ledger entries, newest borrow first"),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    claims: Claims,
    AppQuery(query): AppQuery<ListTransactionsQuery>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let status = query
        .status
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<TransactionStatus>())
        .transpose()?;
    let filter = TransactionFilter {
        status,
        borrower_id: query.borrower_id.filter(|s| !s.is_empty()),
    };

    let transactions =
        circulation_service::list_transactions(state.ledger_repo.as_ref(), filter).await?;

    Ok(Json(json!({
        "transactions": transactions,
        "total": transactions.len()
    })))
}

#[utoipa::path(
    get,
    path = "/api/library/transactions/{transaction_id}",
    params(("transaction_id" = i32, Path, description = "Ledger entry id")),
    responses(
        (status = 200, description = "Ledger entry"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    claims: Claims,
    AppPath(transaction_id): AppPath<i32>,
) -> Result<Json<Value>, ApiError> {
    claims.require_any(LIBRARY_STAFF)?;

    let transaction =
        circulation_service::get_transaction(state.ledger_repo.as_ref(), transaction_id).await?;
    Ok(Json(json!({ "transaction": transaction })))
}

#[utoipa::path(
    get,
    path = "/api/library/student/{id}/transactions",
    params(("id" = String, Path, description = "Borrower id")),
    responses(
        (status = 200, description = "The borrower's ledger entries, newest first"),
        (status = 403, description = "Students may only read their own history")
    )
)]
pub async fn student_transactions(
    State(state): State<AppState>,
    claims: Claims,
    AppPath(borrower_id): AppPath<String>,
) -> Result<Json<Value>, ApiError> {
    let own_history = claims.role == Role::Student && claims.sub == borrower_id;
    if !own_history {
        claims.require_any(LIBRARY_STAFF)?;
    }

    if borrower_id.trim().is_empty() {
        return Err(DomainError::InvalidInput("Borrower ID is required".to_string()).into());
    }

    let transactions =
        circulation_service::borrower_transactions(state.ledger_repo.as_ref(), &borrower_id)
            .await?;

    Ok(Json(json!({
        "transactions": transactions,
        "total": transactions.len()
    })))
}
