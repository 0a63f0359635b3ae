//! Shared helpers for API integration tests.

#![allow(dead_code)]

use absensi_api::auth::jwt::{generate_access_token, JwtConfig};
use absensi_api::auth::password::hash_password;
use absensi_api::config::{CacheBackendKind, ServerConfig};
use absensi_api::router::build_app_router;
use absensi_api::state::AppState;
use absensi_core::datetime::{offset_from_hours, DATE_FORMAT, TIME_FORMAT};
use absensi_core::types::{DbId, Timestamp};
use absensi_db::models::user::{CreateUser, User};
use absensi_db::repositories::{ParticipantGroupRepo, UserRepo};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test `ServerConfig`: UTC form times, in-memory result cache.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        result_cache_backend: CacheBackendKind::Memory,
        result_cache_ttl_secs: 3600,
        utc_offset: offset_from_hours(0).unwrap(),
    }
}

pub fn build_test_state(pool: PgPool, config: ServerConfig) -> AppState {
    AppState::new(pool, config)
}

/// The production router and middleware stack over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(build_test_state(pool, config.clone()), &config)
}

pub fn build_test_app_with(state: AppState) -> Router {
    let config = (*state.config).clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and mint an access token for them.
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> (User, String) {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{}@example.org", name.to_lowercase()),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    let token = generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed");
    (user, token)
}

pub async fn create_group(pool: &PgPool, name: &str) -> DbId {
    ParticipantGroupRepo::create(pool, name)
        .await
        .expect("group creation should succeed")
        .id
}

/// A form payload whose window runs from `start` to `finish` (UTC).
pub fn form_body(title: &str, group_id: DbId, start: Timestamp, finish: Timestamp) -> Value {
    json!({
        "title": title,
        "participant_group_id": group_id,
        "start_at_date": start.format(DATE_FORMAT).to_string(),
        "start_at_time": start.format(TIME_FORMAT).to_string(),
        "finished_at_date": finish.format(DATE_FORMAT).to_string(),
        "finished_at_time": finish.format(TIME_FORMAT).to_string(),
        "allow_update_by_attendee": true,
    })
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}
