#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use gus_auth::{ServerConfig, create_app, db::Database, identity::Identity, policy::AuthPolicy};

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-at-least-32-bytes-long";
pub const TEST_ISSUER: &str = "example.com";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub fn test_policy() -> AuthPolicy {
    AuthPolicy::new(TEST_ISSUER, TEST_ISSUER, TEST_SECRET)
}

/// Create a test app and return (app, db, policy).
pub async fn create_test_app() -> (Router, Database, AuthPolicy) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let policy = test_policy();
    let config = ServerConfig {
        db: db.clone(),
        policy: policy.clone(),
    };
    (create_app(&config), db, policy)
}

/// Insert a user with `TEST_PASSWORD` and return its identity.
pub async fn create_user(db: &Database, email: &str, first: &str, last: &str) -> Identity {
    // Minimum bcrypt cost keeps the tests fast.
    let hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    let id = db.users().create(email, first, last, &hash).await.unwrap();
    Identity {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/authenticate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

/// POST an arbitrary body to `/authenticate`.
pub fn raw_login_request(content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut request = Request::builder().method("POST").uri("/authenticate");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    request.body(Body::from(body.to_string())).unwrap()
}

pub fn get_with_header(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

pub fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    get_with_header(uri, header::AUTHORIZATION, &format!("Bearer {}", token))
}

pub fn refresh_request(cookie_name: &str, token: &str) -> Request<Body> {
    get_with_header(
        "/refresh",
        header::COOKIE,
        &format!("{}={}", cookie_name, token),
    )
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// The `name=value` pair at the front of a Set-Cookie header, split apart.
pub fn cookie_pair(set_cookie: &str) -> (&str, &str) {
    let pair = set_cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').unwrap_or((pair, ""))
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
