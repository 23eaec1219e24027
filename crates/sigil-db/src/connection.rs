//! Database session setup.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Connection settings for the backing SurrealDB instance.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Host and port of the WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "sigil".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Open a WebSocket session, sign in as root, and select the
/// configured namespace and database. The returned handle is cheap to
/// clone and shared across tasks.
pub async fn connect(config: &DbConfig) -> Result<Surreal<Client>, surrealdb::Error> {
    let db = Surreal::new::<Ws>(&config.url).await?;

    db.signin(Root {
        username: &config.username,
        password: &config.password,
    })
    .await?;

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await?;

    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Database session ready"
    );

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_local_instance() {
        let config = DbConfig::default();
        assert_eq!(config.url, "127.0.0.1:8000");
        assert_eq!(config.namespace, "sigil");
        assert_eq!(config.database, "main");
    }
}
