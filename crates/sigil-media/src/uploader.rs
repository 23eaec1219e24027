//! Media upload boundary: trait plus the HTTP implementation.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Reference to uploaded content in the media store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
}

/// Uploads a local temporary file to the media store.
///
/// `upload` returns `None` on any failure; the caller decides whether
/// the missing reference is fatal. Implementations must delete the
/// local file after the attempt, success or failure.
pub trait MediaUploader: Send + Sync {
    fn upload(&self, local_path: &Path) -> impl Future<Output = Option<MediaRef>> + Send;
}

#[derive(Debug, Error)]
enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media store returned status {0}")]
    Status(u16),
}

/// Configuration for the HTTP media store.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Upload endpoint URL.
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Media uploader that POSTs files as multipart to a remote store
/// and expects a `{ "url": ... }` response.
#[derive(Clone)]
pub struct HttpMediaUploader {
    client: reqwest::Client,
    config: MediaConfig,
}

impl HttpMediaUploader {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn try_upload(&self, local_path: &Path) -> Result<MediaRef, MediaError> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::Status(response.status().as_u16()));
        }

        let body: UploadResponse = response.json().await?;
        Ok(MediaRef { url: body.url })
    }
}

impl MediaUploader for HttpMediaUploader {
    async fn upload(&self, local_path: &Path) -> Option<MediaRef> {
        let result = self.try_upload(local_path).await;

        // The local temp file is removed regardless of outcome.
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            warn!(
                path = %local_path.display(),
                error = %e,
                "Failed to remove local temp file"
            );
        }

        match result {
            Ok(media) => Some(media),
            Err(e) => {
                warn!(error = %e, "Media upload failed");
                None
            }
        }
    }
}
