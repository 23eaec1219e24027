//! Repository trait definition for data access abstraction.
//!
//! All repository operations are async. The refresh-token slot lives
//! on the user record itself, so session state is managed through the
//! same repository as the credentials.

use uuid::Uuid;

use crate::error::SigilResult;
use crate::models::user::{CreateUser, User};

pub trait UserRepository: Send + Sync {
    /// Persist a new user. The raw password in the input is hashed
    /// before storage. Fails with `Conflict` if the username or email
    /// is already taken (unique-index backstop).
    fn create(&self, input: CreateUser) -> impl Future<Output = SigilResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SigilResult<User>> + Send;

    /// Look up a user by either unique key. Used for the registration
    /// duplicate check and for login identity resolution.
    fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> impl Future<Output = SigilResult<Option<User>>> + Send;

    /// Overwrite (or clear, with `None`) the single refresh-token
    /// slot. Used by login and logout.
    fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<String>,
    ) -> impl Future<Output = SigilResult<()>> + Send;

    /// Compare-and-set on the refresh-token slot: installs `new` only
    /// if the slot currently holds `expected`, returning whether the
    /// swap happened. The single-record update serializes concurrent
    /// rotations so at most one caller wins.
    fn swap_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> impl Future<Output = SigilResult<bool>> + Send;
}
