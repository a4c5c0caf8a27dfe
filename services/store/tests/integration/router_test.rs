use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use neurarig_auth_types::identity::JwtSecret;
use neurarig_store::domain::repository::BuilderCache;
use neurarig_store::domain::types::CatalogEntry;
use neurarig_store::infra::cache::MokaBuilderCache;
use neurarig_store::router::build_router;
use neurarig_store::state::AppState;
use neurarig_store::usecase::builder::RetryPolicy;
use neurarig_testing::auth::MockAuth;

use crate::helpers::TEST_JWT_SECRET;

/// Router over a disconnected database: only paths that never reach the
/// database are exercised here.
fn server() -> (TestServer, AppState) {
    let upload_dir: PathBuf = std::env::temp_dir().join(format!("neurarig-router-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&upload_dir).unwrap();
    let state = AppState {
        db: DatabaseConnection::default(),
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
        upload_dir,
        llm: None,
        llm_retry: RetryPolicy::default(),
        builder_cache: MokaBuilderCache::new(Duration::from_secs(60)),
    };
    let server = TestServer::new(build_router(state.clone(), None)).unwrap();
    (server, state)
}

fn user_token() -> String {
    MockAuth::user().token(TEST_JWT_SECRET)
}

fn admin_token() -> String {
    MockAuth::admin().token(TEST_JWT_SECRET)
}

// ── Health / middleware ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_liveness_and_echo_request_id() {
    let (server, _) = server();
    let resp = server.get("/healthz").await;
    resp.assert_status_ok();
    let id = resp.header("x-request-id");
    assert!(id.to_str().unwrap().parse::<Uuid>().is_ok());
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_protected_routes_without_valid_token() {
    let (server, _) = server();
    server.get("/api/users/me").await.assert_status(StatusCode::UNAUTHORIZED);
    server.get("/api/cart").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/orders")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let forged = MockAuth::admin().token("some-other-secret");
    server
        .get("/api/users")
        .authorization_bearer(forged)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ── Authorization ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_admin_routes_for_customers() {
    let (server, _) = server();
    let token = user_token();
    let id = Uuid::now_v7();

    let checks = [
        server.get("/api/users").authorization_bearer(&token).await,
        server
            .put(&format!("/api/users/{id}/role"))
            .authorization_bearer(&token)
            .json(&json!({ "role": "admin" }))
            .await,
        server
            .post("/api/categories")
            .authorization_bearer(&token)
            .json(&json!({ "name": "GPUs" }))
            .await,
        server
            .delete(&format!("/api/brands/{id}"))
            .authorization_bearer(&token)
            .await,
        server
            .put(&format!("/api/products/{id}"))
            .authorization_bearer(&token)
            .json(&json!({ "stock": 1 }))
            .await,
        server.get("/api/orders").authorization_bearer(&token).await,
        server
            .put(&format!("/api/orders/{id}/status"))
            .authorization_bearer(&token)
            .json(&json!({ "status": "shipped" }))
            .await,
    ];
    for resp in checks {
        resp.assert_status(StatusCode::FORBIDDEN);
        let body: Value = resp.json();
        assert_eq!(body["kind"], "FORBIDDEN");
    }
}

// ── Input validation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_unknown_sort_and_status_values() {
    let (server, _) = server();
    let resp = server.get("/api/products?sort-by=cheapest").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_INPUT");

    let resp = server
        .put(&format!("/api/orders/{}/status", Uuid::now_v7()))
        .authorization_bearer(admin_token())
        .json(&json!({ "status": "teleported" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_INPUT");
}

#[tokio::test]
async fn should_map_non_uuid_order_id_to_not_found() {
    let (server, _) = server();
    let resp = server
        .get("/api/orders/not-a-uuid")
        .authorization_bearer(user_token())
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["kind"], "ORDER_NOT_FOUND");
}

// ── Builder ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_builder_chat_from_cached_snapshot_without_llm() {
    let (server, state) = server();
    let cpu_id = Uuid::now_v7();
    state.builder_cache.store_snapshot(Arc::new(vec![CatalogEntry {
        id: cpu_id,
        name: "Ryzen 5 7600".into(),
        category: "Processors".into(),
        brand: "AMD".into(),
        price: 19_900,
        stock: 4,
        rating: 4.6,
        image: None,
    }]));

    let resp = server
        .post("/api/builder/chat")
        .json(&json!({ "message": "budget processor under $300" }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["products"][0]["id"], cpu_id.to_string());
    assert_eq!(body["categories"], json!(["Processors"]));

    server
        .post("/api/builder/chat")
        .json(&json!({ "message": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_uploaded_image_and_serve_it() {
    let (server, _) = server();
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let form = MultipartForm::new().add_part(
        "images",
        Part::bytes(png.clone())
            .file_name("case.png")
            .mime_type("image/png"),
    );
    let resp = server
        .post("/api/uploads")
        .authorization_bearer(admin_token())
        .multipart(form)
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body: Value = resp.json();
    let url = body["urls"][0].as_str().unwrap().to_owned();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let served = server.get(&url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().to_vec(), png);
}

#[tokio::test]
async fn should_reject_non_image_upload_and_customer_uploads() {
    let (server, _) = server();
    let text_form = || {
        MultipartForm::new().add_part(
            "images",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        )
    };

    let resp = server
        .post("/api/uploads")
        .authorization_bearer(admin_token())
        .multipart(text_form())
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_UPLOAD");

    server
        .post("/api/uploads")
        .authorization_bearer(user_token())
        .multipart(text_form())
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
