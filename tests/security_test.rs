use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use school_library::auth::{Role, create_jwt, decode_jwt};
use school_library::db;
use school_library::infrastructure::AppState;
use school_library::server;
use sea_orm::DatabaseConnection;
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

async fn status_of(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn issue_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/library/issue")
        .header("Content-Type", "application/json");
    if let Some(value) = auth {
        builder = builder.header("Authorization", value);
    }
    builder
        .body(Body::from(
            json!({ "bookId": 1, "borrowerId": "S1" }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let token = create_jwt("lib1", Role::Librarian).expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "lib1");
    assert_eq!(claims.role, Role::Librarian);
    assert!(claims.require_any(&[Role::Admin, Role::Librarian]).is_ok());
    assert!(claims.require_any(&[Role::Student]).is_err());
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let token = create_jwt("S1", Role::Student).unwrap();
    let mut tampered = token.clone();
    tampered.push('x');

    assert!(decode_jwt(&tampered).is_err());
    assert!(decode_jwt("not.a.jwt").is_err());
}

#[tokio::test]
async fn test_missing_token_returns_401() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = status_of(&app, issue_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");
}

#[tokio::test]
async fn test_malformed_header_returns_401() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, _) = status_of(&app, issue_request(Some("Token abc"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_returns_401() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let (status, body) = status_of(&app, issue_request(Some("Bearer garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_student_cannot_issue_books() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let token = create_jwt("S1", Role::Student).unwrap();

    let (status, body) = status_of(&app, issue_request(Some(&format!("Bearer {}", token)))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn test_teacher_cannot_read_ledger() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let token = create_jwt("T1", Role::Teacher).unwrap();

    let request = Request::builder()
        .uri("/api/library/transactions")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, _) = status_of(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_any_signed_in_role_can_browse_books() {
    let db = setup_test_db().await;
    let app = setup_app(&db);
    let token = create_jwt("C1", Role::Coach).unwrap();

    let request = Request::builder()
        .uri("/api/library/books")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, body) = status_of(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_health_is_public() {
    let db = setup_test_db().await;
    let app = setup_app(&db);

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = status_of(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}
