//! Dashboard API tests
//!
//! Owner-scoped CRUD + analytics over HTTP with bearer auth.

use std::sync::Arc;
use std::sync::Once;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tempfile::TempDir;

use shortgate::analytics::{ClickRecord, ClickSink};
use shortgate::api::middleware::OwnerAuth;
use shortgate::api::services::admin::routes::{redirects_routes, stats_routes};
use shortgate::config::init_config;
use shortgate::storage::backend::{connect_sqlite, run_migrations};
use shortgate::storage::SeaOrmStorage;

// =============================================================================
// Test Setup
// =============================================================================

const JWT_SECRET: &str = "admin-test-secret";

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        unsafe {
            std::env::set_var("SG__AUTH__JWT_SECRET", JWT_SECRET);
        }
        init_config();
    });
}

async fn test_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    init_test_config();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("admin_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let db = connect_sqlite(&db_url).await.expect("Failed to connect");
    run_migrations(&db).await.expect("Failed to run migrations");

    (dir, Arc::new(SeaOrmStorage::from_connection(db, "sqlite")))
}

macro_rules! test_app {
    ($storage:expr) => {
        test::init_service(
            App::new().app_data(web::Data::new($storage.clone())).service(
                web::scope("/api")
                    .wrap(OwnerAuth)
                    .service(redirects_routes())
                    .service(stats_routes()),
            ),
        )
        .await
    };
}

/// 模拟外部身份服务签发的 owner token
fn owner_token(sub: &str) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": sub,
        "iat": now.timestamp(),
        "exp": (now + Duration::hours(1)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn bearer(sub: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", owner_token(sub)))
}

async fn body_json<B>(resp: actix_web::dev::ServiceResponse<B>) -> Value
where
    B: actix_web::body::MessageBody,
    B::Error: std::fmt::Debug,
{
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response should be JSON")
}

// =============================================================================
// Auth
// =============================================================================

#[actix_rt::test]
async fn test_missing_token_is_401() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::get().uri("/api/redirects").send_request(&app).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_garbage_token_is_401() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::get()
        .uri("/api/redirects")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Create
// =============================================================================

#[actix_rt::test]
async fn test_create_redirect() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({
            "code": "promo",
            "target_url": "https://example.com",
            "description": "spring campaign",
            "password": "s3cr3t",
            "targeting_rules": [
                {"kind": "device", "key": "mobile", "target_url": "https://m.example.com"},
                {"kind": "geo", "key": "US", "target_url": "https://us.example.com"}
            ]
        }))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    let data = &body["data"];
    assert_eq!(data["code"], "promo");
    assert_eq!(data["has_password"], true);
    assert_eq!(data["targeting_rules"].as_array().unwrap().len(), 2);
    assert_eq!(data["targeting_rules"][0]["kind"], "device");

    // 密码落库为 Argon2 哈希，响应里不回传
    let stored = storage.find_by_code("promo").await.unwrap().unwrap();
    assert!(stored.password.unwrap().starts_with("$argon2"));
}

#[actix_rt::test]
async fn test_create_generates_code_when_missing() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"target_url": "https://example.com"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    let code = body["data"]["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
}

#[actix_rt::test]
async fn test_create_pending_without_target() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "later"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert!(body["data"]["target_url"].is_null());
}

#[actix_rt::test]
async fn test_create_duplicate_is_409() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let resp = TestRequest::post()
            .uri("/api/redirects")
            .insert_header(bearer("user_1"))
            .set_json(json!({"code": "dup", "target_url": "https://example.com"}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_rt::test]
async fn test_create_rejects_bad_input() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    // 危险协议
    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "evil", "target_url": "javascript:alert(1)"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 非法短码
    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "has space", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 保留路由
    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "api", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 未知规则 kind
    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({
            "code": "rules",
            "targeting_rules": [{"kind": "weather", "key": "rainy", "target_url": "https://example.com"}]
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 非法过期时间
    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "exp", "target_url": "https://example.com", "expires_at": "whenever"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Read / list
// =============================================================================

#[actix_rt::test]
async fn test_list_is_owner_scoped() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    for (code, owner) in [("a1", "user_1"), ("a2", "user_1"), ("b1", "user_2")] {
        let resp = TestRequest::post()
            .uri("/api/redirects")
            .insert_header(bearer(owner))
            .set_json(json!({"code": code, "target_url": "https://example.com"}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = TestRequest::get()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_get_not_owned_is_404() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "mine", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // 别人的记录与不存在的记录不可区分
    let resp = TestRequest::get()
        .uri("/api/redirects/mine")
        .insert_header(bearer("user_2"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = TestRequest::get()
        .uri("/api/redirects/mine")
        .insert_header(bearer("user_1"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Update
// =============================================================================

#[actix_rt::test]
async fn test_update_merges_and_clears_fields() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({
            "code": "edit",
            "target_url": "https://old.example.com",
            "description": "old description",
            "password": "pw"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // 只改 target，description/password 保持
    let resp = TestRequest::put()
        .uri("/api/redirects/edit")
        .insert_header(bearer("user_1"))
        .set_json(json!({"target_url": "https://new.example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["target_url"], "https://new.example.com");
    assert_eq!(body["data"]["description"], "old description");
    assert_eq!(body["data"]["has_password"], true);

    // 空字符串显式清除 target 和密码
    let resp = TestRequest::put()
        .uri("/api/redirects/edit")
        .insert_header(bearer("user_1"))
        .set_json(json!({"target_url": "", "password": ""}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["data"]["target_url"].is_null());
    assert_eq!(body["data"]["has_password"], false);
}

#[actix_rt::test]
async fn test_update_toggle_active() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "toggle", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = TestRequest::put()
        .uri("/api/redirects/toggle")
        .insert_header(bearer("user_1"))
        .set_json(json!({"active": false}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = storage.find_by_code("toggle").await.unwrap().unwrap();
    assert!(!stored.active);
}

// =============================================================================
// Delete
// =============================================================================

#[actix_rt::test]
async fn test_delete_is_204_and_irreversible() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "bye", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = TestRequest::delete()
        .uri("/api/redirects/bye")
        .insert_header(bearer("user_1"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = TestRequest::get()
        .uri("/api/redirects/bye")
        .insert_header(bearer("user_1"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_delete_not_owned_is_404() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "keep", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = TestRequest::delete()
        .uri("/api/redirects/keep")
        .insert_header(bearer("user_2"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Analytics & stats
// =============================================================================

#[actix_rt::test]
async fn test_analytics_endpoint_aggregates() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "tracked", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let mut desktop = ClickRecord::new("tracked".to_string());
    desktop.browser = Some("Chrome".to_string());
    desktop.device = Some("desktop".to_string());
    desktop.country = Some("US".to_string());

    let mut mobile = ClickRecord::new("tracked".to_string());
    mobile.browser = Some("Safari".to_string());
    mobile.device = Some("mobile".to_string());
    mobile.country = Some("US".to_string());

    storage
        .log_clicks_batch(vec![desktop.clone(), desktop, mobile])
        .await
        .unwrap();

    let resp = TestRequest::get()
        .uri("/api/redirects/tracked/analytics")
        .insert_header(bearer("user_1"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let data = &body["data"];

    assert_eq!(data["total_clicks"], 3);
    assert_eq!(data["recent_clicks"].as_array().unwrap().len(), 3);
    assert_eq!(data["countries"][0]["key"], "US");
    assert_eq!(data["countries"][0]["count"], 3);

    // 浏览器分布按次数排序
    assert_eq!(data["browsers"][0]["key"], "Chrome");
    assert_eq!(data["browsers"][0]["count"], 2);
    assert_eq!(data["browsers"][1]["key"], "Safari");

    // 按日趋势里恰好包含今天
    assert_eq!(data["daily"].as_array().unwrap().len(), 1);
    assert_eq!(data["daily"][0]["count"], 3);
}

#[actix_rt::test]
async fn test_analytics_not_owned_is_404() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    let resp = TestRequest::post()
        .uri("/api/redirects")
        .insert_header(bearer("user_1"))
        .set_json(json!({"code": "priv", "target_url": "https://example.com"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = TestRequest::get()
        .uri("/api/redirects/priv/analytics")
        .insert_header(bearer("user_2"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_stats_endpoint() {
    let (_dir, storage) = test_storage().await;
    let app = test_app!(storage);

    for code in ["s1", "s2"] {
        let resp = TestRequest::post()
            .uri("/api/redirects")
            .insert_header(bearer("user_1"))
            .set_json(json!({"code": code, "target_url": "https://example.com"}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    storage.log_click(ClickRecord::new("s1".to_string())).await.unwrap();

    let resp = TestRequest::get()
        .uri("/api/stats")
        .insert_header(bearer("user_1"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["total_links"], 2);
    assert_eq!(body["data"]["active_links"], 2);
    assert_eq!(body["data"]["total_clicks"], 1);
}
