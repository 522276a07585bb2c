//! End-to-end session flows against an in-process backend
//!
//! The backend issues real HS256 tokens; the console never sees the secret
//! and still gates views correctly from the payload alone.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{FileStore, MemoryStore, ROLE_KEY, SessionStore, TOKEN_KEY};
use console::{
    AuthState, ConsoleError, ConsoleShell, Dashboard, DashboardVariant, RefreshPolicy,
    TokenValidator, View, ViewDecision,
    backend::{BackendClient, BackendError},
    decode_claims,
    forms::{LoginForm, RegisterForm},
    session::SessionManager,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const SECRET: &[u8] = b"backend-only-secret";

fn now_s() -> i64 {
    chrono::Utc::now().timestamp()
}

fn mint(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
        .expect("Failed to sign test token")
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn login(Path(role): Path<String>, Json(body): Json<Value>) -> Response {
    if body["password"] != "hunter2" {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let mut claims = json!({ "email": body["email"], "exp": now_s() + 3600 });
    if role == "Client" {
        claims["clientId"] = json!("C1");
    }
    Json(json!({ "token": mint(claims) })).into_response()
}

async fn register(Path(role): Path<String>, Json(body): Json<Value>) -> Response {
    let token = mint(json!({ "email": body["email"], "exp": now_s() + 3600 }));
    match body["email"].as_str() {
        Some("taken@acme.io") => error(StatusCode::BAD_REQUEST, "User already exists"),
        Some("created@acme.io") => (StatusCode::CREATED, Json(json!({ "token": token }))).into_response(),
        _ if role == "Client" && body["companyName"].as_str().unwrap_or("").is_empty() => {
            error(StatusCode::BAD_REQUEST, "Company name required")
        }
        _ => Json(json!({ "token": token })).into_response(),
    }
}

async fn resource(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());

    if !authorized {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(json!({ "data": [] })).into_response()
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/:role/login", post(login))
        .route("/:role/register", post(register))
        .route("/Api", get(resource))
        .route("/ApiKey", get(resource))
        .route("/Client", get(resource));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn mounted<S: SessionStore>(store: S) -> ConsoleShell<S> {
    let mut shell = ConsoleShell::new(TokenValidator::new(store), RefreshPolicy::OnMount);
    shell.mount();
    shell
}

#[tokio::test]
async fn test_client_login_reaches_client_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let sessions = SessionManager::new(store.clone(), BackendClient::new(spawn_backend().await));

    let form = LoginForm {
        email: "ops@acme.io".to_string(),
        password: "hunter2".to_string(),
    };
    sessions.login(console::Role::Client, &form).await.unwrap();
    assert_eq!(store.get(ROLE_KEY).unwrap(), Some("Client".to_string()));

    // A fresh handle on the same file, as after a reload
    let reopened = FileStore::new(dir.path().join("session.json"));
    let mut shell = mounted(&reopened);
    assert_eq!(shell.auth_state(), AuthState::Authenticated);

    let screen = shell.navigate("/dashboard");
    assert_eq!(screen.decision, ViewDecision::Render(View::Dashboard));
    match screen.dashboard {
        Some(Dashboard::Client(Some(ctx))) => {
            assert_eq!(ctx.client_id.as_deref(), Some("C1"));
            assert_eq!(ctx.email, "ops@acme.io");
        }
        other => panic!("unexpected dashboard {other:?}"),
    }

    let data = sessions
        .load_dashboard_data(DashboardVariant::Client)
        .await
        .unwrap();
    let paths: Vec<&str> = data.iter().map(|(path, _)| *path).collect();
    assert_eq!(paths, ["/Api", "/ApiKey"]);
}

#[tokio::test]
async fn test_rejected_login_keeps_store_empty() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(store.clone(), BackendClient::new(spawn_backend().await));

    let form = LoginForm {
        email: "ops@acme.io".to_string(),
        password: "wrong".to_string(),
    };
    let err = sessions.login(console::Role::User, &form).await.unwrap_err();
    match err {
        ConsoleError::Backend(BackendError::Rejected { status, message }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_registered_user_is_sent_from_auth_form_to_dashboard() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(store.clone(), BackendClient::new(spawn_backend().await));

    let form = RegisterForm {
        email: "new@acme.io".to_string(),
        password: "pw".to_string(),
        confirm_password: "pw".to_string(),
        full_name: "New User".to_string(),
        ..Default::default()
    };
    sessions.register(console::Role::User, &form).await.unwrap();

    let mut shell = mounted(store.clone());
    let screen = shell.navigate("/log_reg");
    assert_eq!(screen.decision, ViewDecision::Redirect(View::Dashboard));

    let screen = shell.open("/log_reg");
    assert_eq!(
        screen.dashboard.map(|dashboard| dashboard.variant()),
        Some(DashboardVariant::User)
    );
}

#[tokio::test]
async fn test_registration_failures() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(store.clone(), BackendClient::new(spawn_backend().await));

    let mut form = RegisterForm {
        email: "taken@acme.io".to_string(),
        password: "pw".to_string(),
        confirm_password: "pw".to_string(),
        ..Default::default()
    };
    let err = sessions.register(console::Role::User, &form).await.unwrap_err();
    assert_eq!(err.to_string(), "User already exists");

    // Anything but 200 is a failed registration, even with a token
    form.email = "created@acme.io".to_string();
    let err = sessions.register(console::Role::User, &form).await.unwrap_err();
    assert_eq!(err.to_string(), "Registration failed. Please try again.");

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_logout_returns_to_auth_form() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(store.clone(), BackendClient::new(spawn_backend().await));

    let form = LoginForm {
        email: "ops@acme.io".to_string(),
        password: "hunter2".to_string(),
    };
    sessions.login(console::Role::Client, &form).await.unwrap();
    assert_eq!(mounted(store.clone()).auth_state(), AuthState::Authenticated);

    sessions.logout().unwrap();
    let mut shell = mounted(store.clone());
    assert_eq!(
        shell.open("/dashboard").decision,
        ViewDecision::Render(View::AuthForm)
    );
    assert!(store.is_empty());
}

#[test]
fn test_expired_signed_token_is_purged() {
    let store = MemoryStore::new();
    store
        .set(
            TOKEN_KEY,
            &mint(json!({ "exp": now_s() - 3600, "email": "a@b.com" })),
        )
        .unwrap();
    store.set(ROLE_KEY, "Client").unwrap();

    let validator = TokenValidator::new(&store);
    assert!(!validator.is_session_valid());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

    // The role outlives the token until the next sign-in
    assert_eq!(store.get(ROLE_KEY).unwrap(), Some("Client".to_string()));

    let mut shell = mounted(&store);
    assert_eq!(
        shell.navigate("/dashboard").decision,
        ViewDecision::Redirect(View::AuthForm)
    );
}

#[test]
fn test_unexpired_client_token_scenario() {
    let token = mint(json!({ "exp": now_s() + 3600, "clientId": "C1" }));
    let store = MemoryStore::new();
    store.set(TOKEN_KEY, &token).unwrap();
    store.set(ROLE_KEY, "Client").unwrap();

    let mut shell = mounted(&store);
    let screen = shell.navigate("/dashboard");
    assert_eq!(screen.decision, ViewDecision::Render(View::Dashboard));
    assert_eq!(
        console::select_dashboard_variant(store.get(ROLE_KEY).unwrap().as_deref()),
        DashboardVariant::Client
    );
    assert_eq!(decode_claims(&token).unwrap().client_id.as_deref(), Some("C1"));
    assert_eq!(store.get(TOKEN_KEY).unwrap(), Some(token));
}
