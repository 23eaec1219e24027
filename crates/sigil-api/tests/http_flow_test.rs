//! HTTP-level tests driving the router with `tower::ServiceExt`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use sigil_api::state::AppState;
use sigil_auth::{AuthConfig, SessionService};
use sigil_core::models::user::CreateUser;
use sigil_core::repository::UserRepository;
use sigil_db::SurrealUserRepository;
use sigil_media::{HttpMediaUploader, MediaConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tower::ServiceExt;

const BOUNDARY: &str = "sigil-test-boundary";

fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        ..AuthConfig::default()
    }
}

async fn test_app(media_endpoint: &str) -> (Router, SurrealUserRepository<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sigil_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db);
    let media = HttpMediaUploader::new(MediaConfig {
        endpoint: media_endpoint.into(),
    });
    let sessions = SessionService::new(users.clone(), media, test_config());
    let state = AppState {
        sessions: Arc::new(sessions),
    };

    (sigil_api::router(state), users)
}

/// Router with a pre-seeded account (bob / secret123). The media
/// endpoint points at a closed port; seeded flows never upload.
async fn seeded_app() -> Router {
    let (app, users) = test_app("http://127.0.0.1:9/upload").await;
    users
        .create(CreateUser {
            username: "bob".into(),
            email: "bob@example.com".into(),
            full_name: "Bob Example".into(),
            password: "secret123".into(),
            avatar_url: "https://cdn.test/bob.png".into(),
            cover_url: String::new(),
        })
        .await
        .unwrap();
    app
}

/// Minimal media store accepting any upload.
async fn spawn_media_store() -> String {
    use axum::routing::post;

    let app = Router::new().route(
        "/upload",
        post(|| async { axum::Json(serde_json::json!({ "url": "https://cdn.test/stored.png" })) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/upload")
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the value of a named cookie from Set-Cookie headers.
fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|h| h.starts_with(&format!("{name}=")))
        .and_then(|h| h.split(';').next())
        .and_then(|pair| pair.split_once('='))
        .map(|(_, v)| v.to_string())
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(app: &Router) -> Response<Body> {
    app.clone()
        .oneshot(json_request(
            "/v1/users/login",
            serde_json::json!({ "username": "bob", "password": "secret123" }),
        ))
        .await
        .unwrap()
}

fn text_part(name: &str, value: &str) -> String {
    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
}

fn file_part(name: &str, file_name: &str, contents: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
         filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n"
    )
}

fn register_request(include_avatar: bool) -> Request<Body> {
    let mut body = String::new();
    body.push_str(&text_part("username", "Alice"));
    body.push_str(&text_part("email", "alice@example.com"));
    body.push_str(&text_part("fullName", "Alice Example"));
    body.push_str(&text_part("password", "secret123"));
    if include_avatar {
        body.push_str(&file_part("avatar", "alice.png", "fake image bytes"));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/v1/users/register")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_ok() {
    let (app, _) = test_app("http://127.0.0.1:9/upload").await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_end_to_end() {
    let endpoint = spawn_media_store().await;
    let (app, _) = test_app(&endpoint).await;

    let response = app.oneshot(register_request(true)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["fullName"], "Alice Example");
    assert_eq!(body["avatarUrl"], "https://cdn.test/stored.png");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("refreshToken").is_none());
}

#[tokio::test]
async fn register_without_avatar_is_rejected() {
    let (app, _) = test_app("http://127.0.0.1:9/upload").await;

    let response = app.oneshot(register_request(false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["status"], 400);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn rejected_register_leaves_no_spooled_files() {
    let app = seeded_app().await;

    // Duplicate handle: rejected after spooling, before any upload.
    let avatar_name = format!("dup-{}.png", uuid::Uuid::new_v4());
    let mut body = String::new();
    body.push_str(&text_part("username", "bob"));
    body.push_str(&text_part("email", "bob2@example.com"));
    body.push_str(&text_part("fullName", "Bob Again"));
    body.push_str(&text_part("password", "secret123"));
    body.push_str(&file_part("avatar", &avatar_name, "fake image bytes"));
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let request = Request::builder()
        .method("POST")
        .uri("/v1/users/register")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let orphaned = std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .ends_with(&avatar_name)
        });
    assert!(!orphaned, "spooled upload must be removed on failure");
}

#[tokio::test]
async fn login_sets_cookies_and_returns_tokens() {
    let app = seeded_app().await;

    let response = login(&app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let access = cookie_value(&response, "accessToken").expect("accessToken cookie");
    let refresh = cookie_value(&response, "refreshToken").expect("refreshToken cookie");

    let set_cookies: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();
    assert!(set_cookies.iter().all(|c| c.contains("HttpOnly")));

    let body = json_body(response).await;
    assert_eq!(body["user"]["username"], "bob");
    assert_eq!(body["accessToken"], access);
    assert_eq!(body["refreshToken"], refresh);
}

#[tokio::test]
async fn login_by_email_with_empty_username() {
    let app = seeded_app().await;

    // An empty username must not shadow the supplied email.
    let response = app
        .oneshot(json_request(
            "/v1/users/login",
            serde_json::json!({
                "username": "",
                "email": "bob@example.com",
                "password": "secret123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["username"], "bob");
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() {
    let app = seeded_app().await;

    let response = app
        .oneshot(json_request(
            "/v1/users/login",
            serde_json::json!({ "username": "bob", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn me_with_bearer_token() {
    let app = seeded_app().await;

    let body = json_body(login(&app).await).await;
    let access = body["accessToken"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/users/me")
                .header(AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let me = json_body(response).await;
    assert_eq!(me["username"], "bob");
}

#[tokio::test]
async fn me_without_credentials_is_unauthorized() {
    let app = seeded_app().await;

    let response = app
        .oneshot(Request::builder().uri("/v1/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let app = seeded_app().await;

    let login_response = login(&app).await;
    let refresh = cookie_value(&login_response, "refreshToken").unwrap();

    let rotate = |token: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/users/refresh-token")
                    .header(COOKIE, format!("refreshToken={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let response = rotate(refresh.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let new_refresh = cookie_value(&response, "refreshToken").unwrap();
    assert_ne!(new_refresh, refresh);

    // The consumed token no longer rotates.
    let replay = rotate(refresh).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    // The freshly-issued one does.
    let response = rotate(new_refresh).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_via_json_body() {
    let app = seeded_app().await;

    let body = json_body(login(&app).await).await;
    let refresh = body["refreshToken"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "/v1/users/refresh-token",
            serde_json::json!({ "refreshToken": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_session() {
    let app = seeded_app().await;

    let login_response = login(&app).await;
    let access = cookie_value(&login_response, "accessToken").unwrap();
    let refresh = cookie_value(&login_response, "refreshToken").unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/users/logout")
                .header(COOKIE, format!("accessToken={access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The refresh token was cleared server-side.
    let replay = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/users/refresh-token")
                .header(COOKIE, format!("refreshToken={refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}
