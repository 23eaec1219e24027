//! Request authentication middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use sigil_core::error::SigilError;
use surrealdb::Connection;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticate the request and attach the resolved user as an
/// extension. The token is read from the `accessToken` cookie first,
/// then from a `Bearer` Authorization header.
pub async fn require_auth<C: Connection>(
    State(state): State<AppState<C>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get("accessToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(&request));

    let Some(token) = token else {
        return Err(SigilError::AuthenticationFailed {
            reason: "missing access token".into(),
        }
        .into());
    };

    let user = state.sessions.authenticate(&token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}
