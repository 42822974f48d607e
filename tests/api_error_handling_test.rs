use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use school_library::auth::{Role, create_jwt};
use school_library::db;
use school_library::infrastructure::AppState;
use school_library::server;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn setup_app(db: &DatabaseConnection) -> Router {
    server::build_router(AppState::new(db.clone()), &[])
}

fn staff_header() -> String {
    format!("Bearer {}", create_jwt("admin1", Role::Admin).unwrap())
}

async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", staff_header())
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", staff_header());
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_book(app: &Router, copies: i32) -> i64 {
    let (status, body) = call(
        app,
        "POST",
        "/api/library/books",
        Some(json!({ "title": "Error Cases", "author": "Tester", "totalCopies": copies })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["book"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_issue_unknown_book_returns_404() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = call(
        &app,
        "POST",
        "/api/library/issue",
        Some(json!({ "bookId": 9999, "borrowerId": "S1" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn test_issue_unavailable_book_returns_409() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 0).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/library/issue",
        Some(json!({ "bookId": book_id, "borrowerId": "S1" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Book is not available");
}

#[tokio::test]
async fn test_issue_blank_borrower_returns_400() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 1).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/library/issue",
        Some(json!({ "bookId": book_id, "borrowerId": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Borrower ID is required");
}

#[tokio::test]
async fn test_double_return_returns_409() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 1).await;

    let (_, body) = call(
        &app,
        "POST",
        "/api/library/issue",
        Some(json!({ "bookId": book_id, "borrowerId": "S1" })),
    )
    .await;
    let transaction_id = body["transaction"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        "POST",
        "/api/library/return",
        Some(json!({ "transactionId": transaction_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/library/return/{}", transaction_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Book already returned");

    let (_, body) = call(&app, "GET", &format!("/api/library/books/{}", book_id), None).await;
    assert_eq!(body["book"]["availableCopies"], 1);
}

#[tokio::test]
async fn test_unknown_transaction_returns_404() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = call(&app, "PUT", "/api/library/return/555", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Transaction not found");

    let (status, _) = call(&app, "GET", "/api/library/calculate-fine/555", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let fine = Some(json!({ "fine": 1.0 }));
    let (status, _) = call(&app, "PUT", "/api/library/fine/555", fine).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "GET", "/api/library/transactions/555", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/api/library/books/555", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn test_invalid_fine_returns_400() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 1).await;

    let (_, body) = call(
        &app,
        "POST",
        "/api/library/issue",
        Some(json!({ "bookId": book_id, "borrowerId": "S1" })),
    )
    .await;
    let transaction_id = body["transaction"]["id"].as_i64().unwrap();
    let uri = format!("/api/library/fine/{}", transaction_id);

    let (status, body) = call(&app, "PUT", &uri, Some(json!({ "fine": -5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Valid fine amount is required");

    let (status, _) = call(&app, "PUT", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/library/transactions/{}", transaction_id);
    let (_, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(body["transaction"]["fine"], 0.0);
}

#[tokio::test]
async fn test_invalid_status_filter_returns_400() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = call(&app, "GET", "/api/library/transactions?status=lost", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("lost"));
}

#[tokio::test]
async fn test_shrinking_below_issued_returns_400() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 2).await;

    for borrower in ["S1", "S2"] {
        call(
            &app,
            "POST",
            "/api/library/issue",
            Some(json!({ "bookId": book_id, "borrowerId": borrower })),
        )
        .await;
    }

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/library/books/{}", book_id),
        Some(json!({ "totalCopies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/api/library/books",
        Some(json!({ "title": "Bad", "author": "Count", "totalCopies": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = post_raw(&app, "/api/library/issue", "{ not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).expect("error body is JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wrongly_typed_fine_returns_400_json() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 1).await;

    let (_, body) = call(
        &app,
        "POST",
        "/api/library/issue",
        Some(json!({ "bookId": book_id, "borrowerId": "S1" })),
    )
    .await;
    let transaction_id = body["transaction"]["id"].as_i64().unwrap();

    let uri = format!("/api/library/fine/{}", transaction_id);
    let (status, body) = call(&app, "PUT", &uri, Some(json!({ "fine": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fine"));

    let uri = format!("/api/library/transactions/{}", transaction_id);
    let (_, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(body["transaction"]["fine"], 0.0);
}

#[tokio::test]
async fn test_bad_path_and_query_values_return_400_json() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = call(&app, "GET", "/api/library/calculate-fine/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, "PUT", "/api/library/return/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, "GET", "/api/library/books?available=maybe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_storage_failure_returns_500_without_details() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let book_id = create_book(&app, 3).await;

    db.execute_unprepared("DROP TABLE library_transactions")
        .await
        .unwrap();

    let (status, body) = post_raw(
        &app,
        "/api/library/issue",
        &json!({ "bookId": book_id, "borrowerId": "S1" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Internal server error");

    // The reserved copy was rolled back
    let (_, body) = call(&app, "GET", &format!("/api/library/books/{}", book_id), None).await;
    assert_eq!(body["book"]["availableCopies"], 3);
}
