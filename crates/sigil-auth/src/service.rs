//! Session coordination: registration, login, token rotation,
//! logout, and request authentication.

use std::path::PathBuf;

use uuid::Uuid;

use sigil_core::error::{SigilError, SigilResult};
use sigil_core::models::user::{CreateUser, UserView};
use sigil_core::repository::UserRepository;
use sigil_media::MediaUploader;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::{password, token};

/// Input for account registration.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Local path of the uploaded avatar file. Mandatory.
    pub avatar_path: Option<PathBuf>,
    /// Local path of the uploaded cover image. Optional.
    pub cover_path: Option<PathBuf>,
}

/// Input for credential login.
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Username or email; either unique key is accepted.
    pub identifier: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful refresh-token rotation.
#[derive(Debug, Clone)]
pub struct RotateOutput {
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates account and session lifecycle on top of a user store
/// and a media uploader.
pub struct SessionService<R, M>
where
    R: UserRepository,
    M: MediaUploader,
{
    users: R,
    media: M,
    config: AuthConfig,
}

impl<R, M> SessionService<R, M>
where
    R: UserRepository,
    M: MediaUploader,
{
    pub fn new(users: R, media: M, config: AuthConfig) -> Self {
        Self {
            users,
            media,
            config,
        }
    }

    /// Register a new account.
    ///
    /// The username is lowercased before storage so lookups are
    /// case-insensitive. The avatar is mandatory; the cover image is
    /// best-effort and stored as an empty URL when absent or when its
    /// upload fails.
    pub async fn register(&self, input: RegisterInput) -> SigilResult<UserView> {
        // 1. All text fields must be non-empty after trimming.
        let username = input.username.trim().to_lowercase();
        let email = input.email.trim().to_string();
        let full_name = input.full_name.trim().to_string();
        if username.is_empty()
            || email.is_empty()
            || full_name.is_empty()
            || input.password.trim().is_empty()
        {
            return Err(SigilError::validation("all fields are required"));
        }

        // 2. Pre-flight uniqueness check. The store's unique indexes
        //    remain the backstop for races.
        if self
            .users
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            return Err(SigilError::Conflict {
                entity: "user".into(),
            });
        }

        // 3. Upload media. Both files are consumed (and their temp
        //    copies removed) before the avatar requirement is checked.
        let avatar = match &input.avatar_path {
            Some(path) => self.media.upload(path).await,
            None => None,
        };
        let cover_url = match &input.cover_path {
            Some(path) => self
                .media
                .upload(path)
                .await
                .map(|m| m.url)
                .unwrap_or_default(),
            None => String::new(),
        };
        let Some(avatar) = avatar else {
            return Err(SigilError::validation("avatar file is required"));
        };

        // 4. Persist. The store hashes the password before write.
        let created = self
            .users
            .create(CreateUser {
                username,
                email,
                full_name,
                password: input.password,
                avatar_url: avatar.url,
                cover_url,
            })
            .await?;

        // 5. Read the record back to confirm the write landed.
        let user = self
            .users
            .get_by_id(created.id)
            .await
            .map_err(|_| SigilError::Internal("registered user could not be read back".into()))?;

        Ok(user.into())
    }

    /// Authenticate credentials and open a session.
    ///
    /// Issues an access/refresh token pair and installs the refresh
    /// token as the account's single active session, displacing any
    /// previous one.
    pub async fn login(&self, input: LoginInput) -> SigilResult<LoginOutput> {
        // 1. An identifier must be supplied at all.
        let identifier = input.identifier.trim();
        if identifier.is_empty() {
            return Err(SigilError::validation("username or email is required"));
        }

        // 2. Look up by either unique key. A missing user and a wrong
        //    password produce the same error.
        let Some(user) = self
            .users
            .find_by_username_or_email(identifier, identifier)
            .await?
        else {
            return Err(AuthError::InvalidCredentials.into());
        };

        // 3. Verify the password.
        if !password::verify_password(&input.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 4. Mint the pair and install the refresh token.
        let access_token = token::issue_access_token(user.id, &self.config)?;
        let refresh_token = token::issue_refresh_token(user.id, &self.config)?;
        self.users
            .set_refresh_token(user.id, Some(refresh_token.clone()))
            .await?;

        Ok(LoginOutput {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a fresh access/refresh pair.
    ///
    /// The new refresh token is installed only if the presented one
    /// still occupies the account's session slot, so of two
    /// concurrent rotations with the same token at most one succeeds.
    pub async fn rotate(&self, presented: &str) -> SigilResult<RotateOutput> {
        // 1. A token must be presented at all.
        if presented.is_empty() {
            return Err(AuthError::TokenInvalid("no refresh token presented".into()).into());
        }

        // 2. Signature, expiry, and issuer.
        let claims = token::decode_refresh_token(presented, &self.config)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::TokenInvalid("malformed subject claim".into()))?;

        // 3. The subject must still exist.
        let user = match self.users.get_by_id(user_id).await {
            Ok(user) => user,
            Err(SigilError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".into()).into());
            }
            Err(e) => return Err(e),
        };

        // 4. Mint the replacement pair, then swap it in only if the
        //    presented token is still the active one.
        let access_token = token::issue_access_token(user.id, &self.config)?;
        let refresh_token = token::issue_refresh_token(user.id, &self.config)?;
        let swapped = self
            .users
            .swap_refresh_token(user.id, presented, &refresh_token)
            .await?;
        if !swapped {
            return Err(
                AuthError::TokenInvalid("refresh token expired or already used".into()).into(),
            );
        }

        Ok(RotateOutput {
            access_token,
            refresh_token,
        })
    }

    /// Close the account's session by clearing its refresh token.
    ///
    /// Idempotent: logging out an account with no active session
    /// succeeds.
    pub async fn logout(&self, user_id: Uuid) -> SigilResult<()> {
        self.users.set_refresh_token(user_id, None).await
    }

    /// Validate an access token and resolve its subject.
    pub async fn authenticate(&self, access_token: &str) -> SigilResult<UserView> {
        let claims = token::decode_access_token(access_token, &self.config)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::TokenInvalid("malformed subject claim".into()))?;

        let user = match self.users.get_by_id(user_id).await {
            Ok(user) => user,
            Err(SigilError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".into()).into());
            }
            Err(e) => return Err(e),
        };

        Ok(user.into())
    }
}
