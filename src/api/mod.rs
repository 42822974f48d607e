pub mod books;
pub mod circulation;
pub mod error;
pub mod extract;
pub mod health;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Inventory
        .route(
            "/library/books",
            get(books::list_books).post(books::create_book),
        )
        .route(
            "/library/books/:id",
            get(books::get_book).put(books::update_book),
        )
        // Circulation
        .route("/library/issue", post(circulation::issue_book))
        .route("/library/return", post(circulation::return_book))
        .route(
            "/library/return/:transaction_id",
            put(circulation::return_book_by_id),
        )
        // Ledger
        .route("/library/transactions", get(circulation::list_transactions))
        .route(
            "/library/transactions/:transaction_id",
            get(circulation::get_transaction),
        )
        .route(
            "/library/student/:id/transactions",
            get(circulation::student_transactions),
        )
        // Fine management
        .route(
            "/library/calculate-fine/:transaction_id",
            get(circulation::calculate_fine),
        )
        .route("/library/fine/:transaction_id", put(circulation::update_fine))
        .with_state(state)
}
