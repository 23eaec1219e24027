//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use serde::Deserialize;
use sigil_core::error::SigilResult;
use sigil_core::models::user::{CreateUser, User};
use sigil_core::repository::UserRepository;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct UserRow {
    username: String,
    email: String,
    full_name: String,
    password_hash: String,
    avatar_url: String,
    cover_url: String,
    refresh_token: Option<String>,
    created_at: Datetime,
    updated_at: Datetime,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct UserRowWithId {
    record_id: String,
    username: String,
    email: String,
    full_name: String,
    password_hash: String,
    avatar_url: String,
    cover_url: String,
    refresh_token: Option<String>,
    created_at: Datetime,
    updated_at: Datetime,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
            cover_url: self.cover_url,
            refresh_token: self.refresh_token,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
            cover_url: self.cover_url,
            refresh_token: self.refresh_token,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// The salt is randomly generated for each call.
fn hash_password(password: &str) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Query(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Query(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Map a create-time query failure, surfacing unique-index violations
/// as `Conflict`. The coordinator checks uniqueness first; this is the
/// store-level backstop.
fn map_create_error(message: String) -> DbError {
    if message.contains("already contains") {
        DbError::Conflict {
            entity: "user".into(),
        }
    } else {
        DbError::Query(message)
    }
}

/// SurrealDB implementation of the User repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

// Manual impl: the engine types are not `Clone`, but the handle is.
impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> SigilResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password)?;

        let result = self
            .db
            .query(
                "CREATE type::thing('user', $id) SET \
                 username = $username, \
                 email = $email, \
                 full_name = $full_name, \
                 password_hash = $password_hash, \
                 avatar_url = $avatar_url, \
                 cover_url = $cover_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("full_name", input.full_name))
            .bind(("password_hash", password_hash))
            .bind(("avatar_url", input.avatar_url))
            .bind(("cover_url", input.cover_url))
            .await
            .map_err(|e| map_create_error(e.to_string()))?;

        let mut result = result.check().map_err(|e| map_create_error(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> SigilResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> SigilResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username OR email = $email \
                 LIMIT 1",
            )
            .bind(("username", username.to_string()))
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> SigilResult<()> {
        self.db
            .query(
                "UPDATE type::thing('user', $id) SET \
                 refresh_token = $refresh_token, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("refresh_token", token))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn swap_refresh_token(&self, id: Uuid, expected: &str, new: &str) -> SigilResult<bool> {
        // Single-record conditional update: SurrealDB applies it
        // atomically, so of two racing rotations only one observes a
        // matching slot.
        let mut result = self
            .db
            .query(
                "UPDATE type::thing('user', $id) SET \
                 refresh_token = $new, updated_at = time::now() \
                 WHERE refresh_token = $expected",
            )
            .bind(("id", id.to_string()))
            .bind(("expected", expected.to_string()))
            .bind(("new", new.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }
}
