//! Error types for the Sigil system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigilError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity already exists: {entity}")]
    Conflict { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SigilError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type SigilResult<T> = Result<T, SigilError>;
