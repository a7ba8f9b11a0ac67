#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use entities::{Account, Identity, Profile, Role};
use task_store::{MemoryTaskStore, TaskStore};
use taskboard_server::{config::Config, create_app, create_state, state::AppState};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "Str0ng-Passw0rd";

pub type TestState = Arc<AppState<MemoryTaskStore>>;

pub fn test_app_with(config: Config) -> (Router, TestState) {
    let state = create_state(config, MemoryTaskStore::new());
    (create_app(state.clone()), state)
}

pub fn test_app() -> (Router, TestState) {
    test_app_with(Config::for_testing("integration-test-secret"))
}

/// A seeded account and a token for it.
pub struct Seeded {
    pub id: Uuid,
    pub token: String,
}

pub async fn seed_account(
    state: &TestState,
    username: &str,
    role: Role,
    assigned_admin: Option<Uuid>,
) -> Seeded {
    let identity = Identity::new(username)
        .with_email(format!("{username}@example.com"))
        .with_password_hash(state.hasher.hash(PASSWORD).expect("hash"));
    let mut profile = Profile::new(identity.id).with_role(role);
    profile.assigned_admin = assigned_admin;

    let Account { identity, .. } = state
        .store
        .create_account(identity, profile)
        .await
        .expect("seed account");
    let token = state
        .jwt_manager
        .generate_token(identity.id, &identity.username)
        .expect("token");
    Seeded {
        id: identity.id,
        token,
    }
}

/// superadmin `root`, admin `boss` overseeing `alice`, and unmanaged `bob`.
pub struct Fixture {
    pub root: Seeded,
    pub boss: Seeded,
    pub alice: Seeded,
    pub bob: Seeded,
}

pub async fn seed_fixture(state: &TestState) -> Fixture {
    let root = seed_account(state, "root", Role::Superadmin, None).await;
    let boss = seed_account(state, "boss", Role::Admin, None).await;
    let alice = seed_account(state, "alice", Role::User, Some(boss.id)).await;
    let bob = seed_account(state, "bob", Role::User, None).await;
    Fixture {
        root,
        boss,
        alice,
        bob,
    }
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn form_request(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    builder("POST", uri, token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    builder("GET", uri, token).body(Body::empty()).expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("response")
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("location")
        .to_string()
}
