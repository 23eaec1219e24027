//! Authentication error types.

use sigil_core::error::SigilError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Covers both "no such user" and "wrong password"; callers must
    /// not be able to tell the two apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for SigilError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Crypto(msg) => SigilError::Crypto(msg),
            other => SigilError::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}
