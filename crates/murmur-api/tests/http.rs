use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use murmur_api::{AppStateInner, router};
use murmur_db::Database;

fn app() -> Router {
    let db = Arc::new(Database::open_in_memory().unwrap());
    router(Arc::new(AppStateInner::new(db, "test-secret", Duration::hours(1))))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> (StatusCode, Value) {
    call(
        app,
        post_json(
            "/auth/register",
            None,
            json!({ "username": username, "email": email, "password": password }),
        ),
    )
    .await
}

async fn login(app: &Router, identifier: &str, password: &str) -> (StatusCode, Value) {
    call(
        app,
        post_json(
            "/auth/login",
            None,
            json!({ "identifier": identifier, "password": password }),
        ),
    )
    .await
}

async fn token_for(app: &Router, identifier: &str, password: &str) -> String {
    let (status, body) = login(app, identifier, password).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let resp = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn register_login_post_and_list() {
    let app = app();

    let (status, alice) = register(&app, "alice", "alice@x.com", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, bob) = register(&app, "bob", "bob@x.com", "pw2").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(alice["user_id"], bob["user_id"]);

    let token = token_for(&app, "alice", "pw1").await;

    let (status, created) = call(
        &app,
        post_json("/messages", Some(&token), json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "hello");

    // The form field name used by older clients is still accepted.
    let (status, _) = call(
        &app,
        post_json("/messages", Some(&token), json!({ "new_message": "world" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let bob_token = token_for(&app, "bob@x.com", "pw2").await;
    let (status, list) = call(&app, get("/messages", Some(&bob_token))).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["world", "hello"]);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    register(&app, "alice", "alice@x.com", "pw1").await;

    let (status, by_name) = register(&app, "alice", "fresh@x.com", "pw").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, by_email) = register(&app, "fresh", "Alice@X.com", "pw").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Which field collided is not disclosed.
    assert_eq!(by_name, by_email);
}

#[tokio::test]
async fn registration_requires_all_fields() {
    let app = app();
    let (status, body) = register(&app, "  ", "a@x.com", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn failed_logins_are_indistinguishable() {
    let app = app();
    register(&app, "alice", "alice@x.com", "pw1").await;

    let wrong_password = login(&app, "alice", "wrong").await;
    let unknown_user = login(&app, "mallory", "pw1").await;
    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn login_accepts_username_field_alias() {
    let app = app();
    register(&app, "alice", "alice@x.com", "pw1").await;

    let (status, body) = call(
        &app,
        post_json("/auth/login", None, json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn message_routes_require_a_session() {
    let app = app();

    let (status, _) = call(&app, get("/messages", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, post_json("/messages", None, json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, get("/messages", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_message_rejected() {
    let app = app();
    register(&app, "alice", "alice@x.com", "pw1").await;
    let token = token_for(&app, "alice", "pw1").await;

    let (status, _) = call(
        &app,
        post_json("/messages", Some(&token), json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = call(&app, get("/messages", Some(&token))).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn me_and_logout() {
    let app = app();
    register(&app, "alice", "Alice@X.com", "pw1").await;
    let token = token_for(&app, "alice", "pw1").await;

    let (status, me) = call(&app, get("/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "alice@x.com");

    let resp = app
        .clone()
        .oneshot(post_json("/auth/logout", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (status, _) = call(&app, get("/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
