//! Sigil server binary.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use sigil_api::state::AppState;
use sigil_auth::{AuthConfig, SessionService};
use sigil_db::{DbConfig, SurrealUserRepository};
use sigil_media::{HttpMediaUploader, MediaConfig};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sigil=info".parse()?),
        )
        .json()
        .init();

    let db_config = DbConfig {
        url: env_or("SIGIL_DB_URL", "127.0.0.1:8000"),
        namespace: env_or("SIGIL_DB_NAMESPACE", "sigil"),
        database: env_or("SIGIL_DB_DATABASE", "main"),
        username: env_or("SIGIL_DB_USERNAME", "root"),
        password: env_or("SIGIL_DB_PASSWORD", "root"),
    };
    let db = sigil_db::connect(&db_config)
        .await
        .context("failed to connect to SurrealDB")?;
    sigil_db::run_migrations(&db)
        .await
        .context("failed to run migrations")?;

    let auth_config = AuthConfig {
        access_token_secret: std::env::var("SIGIL_ACCESS_TOKEN_SECRET")
            .context("SIGIL_ACCESS_TOKEN_SECRET must be set")?,
        refresh_token_secret: std::env::var("SIGIL_REFRESH_TOKEN_SECRET")
            .context("SIGIL_REFRESH_TOKEN_SECRET must be set")?,
        access_token_lifetime_secs: env_parsed("SIGIL_ACCESS_TOKEN_TTL_SECS", 900)?,
        refresh_token_lifetime_secs: env_parsed("SIGIL_REFRESH_TOKEN_TTL_SECS", 864_000)?,
        issuer: env_or("SIGIL_JWT_ISSUER", "sigil"),
    };
    anyhow::ensure!(
        auth_config.access_token_secret != auth_config.refresh_token_secret,
        "access and refresh token secrets must differ"
    );

    let media = HttpMediaUploader::new(MediaConfig {
        endpoint: env_or("SIGIL_MEDIA_ENDPOINT", "http://127.0.0.1:9100/upload"),
    });

    let users = SurrealUserRepository::new(db);
    let sessions = SessionService::new(users, media, auth_config);
    let state = AppState {
        sessions: Arc::new(sessions),
    };

    let mut app = sigil_api::router(state).layer(TraceLayer::new_for_http());

    // Browser clients need credentialed CORS; wildcard origins are
    // not allowed with credentials, so the origin must be explicit.
    if let Ok(origin) = std::env::var("CORS_ORIGIN") {
        let cors = CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>().context("invalid CORS origin")?)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true);
        app = app.layer(cors);
    }

    let addr = env_or("SIGIL_BIND_ADDR", "0.0.0.0:8080");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Sigil server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed(key: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{key} must be an integer")),
        Err(_) => Ok(default),
    }
}
