//! HTTP surface tests that run without a live database.
//!
//! The pool is created with `connect_lazy`, so no connection is made
//! until a handler actually queries it. Every case here either never
//! touches the database (webhook validation, admin auth rejection) or
//! tolerates it being down (health reports degraded).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use zawadi_api::config::ServerConfig;
use zawadi_api::router::build_app_router;
use zawadi_api::state::AppState;
use zawadi_core::bundle::BundleSize;
use zawadi_ledger::{FeedbackIntake, InMemoryRateLimitStore, RewardLedger, WebhookReconciler};
use zawadi_telco::{BundleReceipt, BundleSender, TelcoError};

struct NoopSender;

#[async_trait::async_trait]
impl BundleSender for NoopSender {
    async fn send_bundle(
        &self,
        phone_number: &str,
        bundle: BundleSize,
        _repeat_count: u32,
    ) -> Result<BundleReceipt, TelcoError> {
        Ok(BundleReceipt {
            transaction_id: "AT-test".to_string(),
            phone_number: phone_number.to_string(),
            bundle,
            status: "Sent".to_string(),
        })
    }
}

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 5,
        app_base_url: "http://localhost:3000".to_string(),
        admin_api_token: Some(ADMIN_TOKEN.to_string()),
    }
}

fn test_app() -> Router {
    // Nothing is listening on this address; handlers that query the
    // pool get a connection error, which is what these tests exercise.
    let pool = PgPool::connect_lazy("postgres://postgres@127.0.0.1:1/zawadi_test")
        .expect("lazy pool construction");

    let config = test_config();
    let ledger = Arc::new(RewardLedger::new(pool.clone(), Arc::new(NoopSender)));
    let intake = Arc::new(FeedbackIntake::new(
        pool.clone(),
        Arc::clone(&ledger),
        Arc::new(InMemoryRateLimitStore::new()),
    ));
    let reconciler = Arc::new(WebhookReconciler::new(pool.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ledger,
        intake,
        reconciler,
    };

    build_app_router(state, &config)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn validation_webhook_always_approves() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/webhooks/telco/validation")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"phoneNumber":"+254712345678","transactionId":"ATPid_abc"}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "Validated");
}

#[tokio::test]
async fn notification_webhook_returns_200_for_incomplete_payload() {
    let app = test_app();

    // No status field: the reconciler ignores it without touching the
    // database, and the provider still gets its 200.
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/webhooks/telco/notification")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"transactionId":"ATPid_xyz"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "Received");
}

#[tokio::test]
async fn admin_route_without_token_is_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/admin/rewards")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn admin_route_with_wrong_token_is_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/admin/rewards")
        .header(header::AUTHORIZATION, "Bearer not-the-token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_route_with_malformed_header_is_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/admin/rewards")
        .header(header::AUTHORIZATION, format!("Basic {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_degraded_when_database_is_down() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/nope")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
