#![allow(dead_code, missing_docs, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rstest::fixture;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::info;

pub const TOKEN: &str = "abc";

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

type Hits = Arc<Mutex<Vec<String>>>;

/// An HR management API stub bound to an ephemeral port.
pub struct MockApi {
    pub base_url: String,
    hits: Hits,
    handle: JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        init_tracing();

        let hits = Hits::default();
        let router = Router::new()
            .nest("/api", api_router())
            .layer(middleware::from_fn_with_state(hits.clone(), record_hit));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        info!(%addr, "launching mock API");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server launched");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            hits,
            handle,
        }
    }

    /// `METHOD /path` of every request received so far.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().expect("hits lock").clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[fixture]
pub async fn api() -> MockApi {
    MockApi::start().await
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{addr}/api")
}

async fn record_hit(State(hits): State<Hits>, request: Request, next: Next) -> Response {
    let hit = format!("{} {}", request.method(), request.uri().path());
    hits.lock().expect("hits lock").push(hit);
    next.run(request).await
}

fn api_router() -> Router {
    Router::new()
        .route("/auth/login/", post(login))
        .route("/token/", get(method_not_allowed))
        .route("/dashboard/stats/", get(dashboard_stats))
        .route("/users/", get(users))
        .route("/leaves/", get(leaves))
        .route("/departments/", get(departments))
        .route("/documents/", get(documents))
        .route("/broken/", get(broken))
        .route("/me/", get(me))
        .route("/empty/", get(no_content))
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    match (username, password) {
        (Some("admin"), Some("admin123")) => Json(json!({
            "token": TOKEN,
            "user_id": 1,
            "username": "admin",
            "role": "admin"
        }))
        .into_response(),
        (Some("notoken"), _) => Json(json!({"detail": "Login successful"})).into_response(),
        (Some("created"), _) => {
            (StatusCode::CREATED, Json(json!({"token": "xyz"}))).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": ["Unable to log in with provided credentials."]})),
        )
            .into_response(),
    }
}

fn has_token(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"detail": "Method \"GET\" not allowed."})),
    )
        .into_response()
}

async fn dashboard_stats(headers: HeaderMap) -> Response {
    if !has_token(&headers, "Token abc") {
        return unauthorized();
    }
    Json(json!({
        "total_users": 2,
        "total_departments": 1,
        "today_attendance": 2,
        "pending_leaves": 0
    }))
    .into_response()
}

async fn users(headers: HeaderMap) -> Response {
    if !has_token(&headers, "Token abc") {
        return unauthorized();
    }
    Json(json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [{"id": 1}, {"id": 2}]
    }))
    .into_response()
}

async fn leaves() -> Response {
    unauthorized()
}

async fn departments() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "HR"},
        {"id": 2, "name": "Engineering"}
    ]))
}

async fn documents() -> Json<Value> {
    Json(json!({
        "count": 12,
        "next": "http://localhost:8000/api/documents/?page=2",
        "previous": null,
        "results": [{"id": 7, "title": "Salary slip", "owner": 1}]
    }))
}

async fn broken() -> &'static str {
    "<html>Internal error</html>"
}

async fn me(headers: HeaderMap) -> Response {
    if !has_token(&headers, "Bearer abc") {
        return unauthorized();
    }
    Json(json!({"id": 1, "username": "admin"})).into_response()
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
