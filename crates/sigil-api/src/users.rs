//! User account routes: register, login, refresh, logout, me.

use std::path::{Path, PathBuf};

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use sigil_auth::{LoginInput, RegisterInput};
use sigil_core::error::SigilError;
use sigil_core::models::user::UserView;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn routes<C: Connection>(state: AppState<C>) -> Router {
    let protected = Router::new()
        .route("/v1/users/logout", post(logout::<C>))
        .route("/v1/users/me", get(me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth::<C>,
        ));

    Router::new()
        .route("/v1/users/register", post(register::<C>))
        .route("/v1/users/login", post(login::<C>))
        .route("/v1/users/refresh-token", post(refresh_token::<C>))
        .merge(protected)
        .with_state(state)
}

async fn register<C: Connection>(
    State(state): State<AppState<C>>,
    mut multipart: Multipart,
) -> Result<Json<UserView>, ApiError> {
    let mut username = String::new();
    let mut email = String::new();
    let mut full_name = String::new();
    let mut password = String::new();
    let mut avatar_path = None;
    let mut cover_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SigilError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("username") => username = field_text(field).await?,
            Some("email") => email = field_text(field).await?,
            Some("fullName") => full_name = field_text(field).await?,
            Some("password") => password = field_text(field).await?,
            Some("avatar") => avatar_path = Some(spool_to_temp(field).await?),
            Some("coverImage") => cover_path = Some(spool_to_temp(field).await?),
            _ => {}
        }
    }

    let result = state
        .sessions
        .register(RegisterInput {
            username,
            email,
            full_name,
            password,
            avatar_path: avatar_path.clone(),
            cover_path: cover_path.clone(),
        })
        .await;

    // The uploader removes spooled files after an upload attempt, but
    // a failure before that point would orphan them.
    if result.is_err() {
        for path in [avatar_path, cover_path].into_iter().flatten() {
            let _ = tokio::fs::remove_file(&path).await;
        }
    }

    Ok(Json(result?))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| SigilError::validation(format!("malformed multipart field: {e}")).into())
}

/// Write an uploaded file to a uniquely-named temp path. The media
/// uploader removes it after the upload attempt.
async fn spool_to_temp(field: axum::extract::multipart::Field<'_>) -> Result<PathBuf, ApiError> {
    let file_name = field
        .file_name()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "upload".into());
    // Strip any client-supplied directory components.
    let file_name = Path::new(&file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| SigilError::validation(format!("malformed multipart field: {e}")))?;

    let path = std::env::temp_dir().join(format!("sigil-upload-{}-{file_name}", Uuid::new_v4()));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| SigilError::Internal(format!("failed to spool upload: {e}")))?;

    Ok(path)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    email: Option<String>,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user: UserView,
    access_token: String,
    refresh_token: String,
}

async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // An empty username counts as absent, not as the identifier.
    let identifier = body
        .username
        .filter(|u| !u.trim().is_empty())
        .or(body.email)
        .unwrap_or_default();

    let out = state
        .sessions
        .login(LoginInput {
            identifier,
            password: body.password,
        })
        .await?;

    let jar = jar
        .add(auth_cookie("accessToken", out.access_token.clone()))
        .add(auth_cookie("refreshToken", out.refresh_token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            user: out.user,
            access_token: out.access_token,
            refresh_token: out.refresh_token,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

async fn refresh_token<C: Connection>(
    State(state): State<AppState<C>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    // Cookie first, JSON body as fallback for non-browser clients.
    let presented = jar
        .get("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(b)| b.refresh_token))
        .unwrap_or_default();

    let out = state.sessions.rotate(&presented).await?;

    let jar = jar
        .add(auth_cookie("accessToken", out.access_token.clone()))
        .add(auth_cookie("refreshToken", out.refresh_token.clone()));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: out.access_token,
            refresh_token: out.refresh_token,
        }),
    ))
}

async fn logout<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(user): Extension<UserView>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.logout(user.id).await?;

    let jar = jar
        .remove(Cookie::build(("accessToken", "")).path("/").build())
        .remove(Cookie::build(("refreshToken", "")).path("/").build());

    Ok((jar, Json(serde_json::json!({ "message": "logged out" }))))
}

async fn me(Extension(user): Extension<UserView>) -> Json<UserView> {
    Json(user)
}

fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}
