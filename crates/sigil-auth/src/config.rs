//! Authentication configuration.

/// Configuration for the token service and session coordinator.
///
/// The two signing secrets must be distinct so that an access token
/// can never be presented where a refresh token is expected.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for signing access tokens (HS256).
    pub access_token_secret: String,
    /// Secret key for signing refresh tokens (HS256).
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 864_000 = 10 days).
    pub refresh_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 864_000,
            issuer: "sigil".into(),
        }
    }
}
