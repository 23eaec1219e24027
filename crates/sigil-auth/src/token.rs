//! JWT issuance and validation.
//!
//! Two token kinds share one claim set but are signed with separate
//! secrets: a short-lived access token presented on every request,
//! and a long-lived refresh token used only to mint replacements.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiry (Unix timestamp).
    pub exp: i64,
    /// Unique token id, so two tokens minted in the same second for
    /// the same subject are still distinct strings.
    pub jti: String,
}

/// Issue a short-lived access token for the given user.
pub fn issue_access_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    issue(
        user_id,
        &config.access_token_secret,
        config.access_token_lifetime_secs,
        &config.issuer,
    )
}

/// Issue a long-lived refresh token for the given user.
pub fn issue_refresh_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    issue(
        user_id,
        &config.refresh_token_secret,
        config.refresh_token_lifetime_secs,
        &config.issuer,
    )
}

/// Validate an access token and return its claims.
pub fn decode_access_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    decode(token, &config.access_token_secret, &config.issuer)
}

/// Validate a refresh token and return its claims.
pub fn decode_refresh_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    decode(token, &config.refresh_token_secret, &config.issuer)
}

fn issue(
    user_id: Uuid,
    secret: &str,
    lifetime_secs: u64,
    issuer: &str,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iss: issuer.to_string(),
        iat: now,
        exp: now + lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encoding failed: {e}")))
}

fn decode(token: &str, secret: &str, issuer: &str) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["sub", "iss", "exp"]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}
