//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique handle, stored lowercase.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    pub full_name: String,
    /// Argon2id PHC-format hash. Never exposed outside the store.
    pub password_hash: String,
    pub avatar_url: String,
    /// Empty string when no cover image was provided.
    pub cover_url: String,
    /// Single refresh-token slot. At most one valid value at a time:
    /// login and rotation overwrite it, logout clears it.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub avatar_url: String,
    pub cover_url: String,
}

/// Identity projection excluding the password hash and refresh token.
///
/// This is the only user shape that crosses the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_url: user.cover_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
