//! Shared application state.

use std::sync::Arc;

use sigil_auth::SessionService;
use sigil_db::SurrealUserRepository;
use sigil_media::HttpMediaUploader;
use surrealdb::Connection;

/// State handed to every handler. Generic over the database engine
/// so tests can run against the in-memory one.
pub struct AppState<C: Connection> {
    pub sessions: Arc<SessionService<SurrealUserRepository<C>, HttpMediaUploader>>,
}

// Manual impl: `#[derive(Clone)]` would demand `C: Clone`, which the
// engine types do not provide and the Arc does not need.
impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}
