//! Storage client for product media.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use stockpilot_core::MediaUrl;
use tracing::{info, warn};

use crate::auth::AuthCache;
use crate::error::{MediaError, MediaResult};
use crate::types::{
    AccountAuthorization, MediaConfig, UploadCredentials, UploadProgress, UploadedMedia,
};
use crate::MEDIA_USER_AGENT;

mod helpers;
mod http;

pub use helpers::sanitize_file_name;
use helpers::final_file_name;
use http::HttpBackend;

/// Called as upload bytes are handed to the transport.
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Client for the object-storage service.
#[derive(Debug, Clone)]
pub struct MediaClient {
    http: HttpBackend,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> MediaResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(MEDIA_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| MediaError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                auth: AuthCache::new(config.auth_ttl_secs),
                config,
            },
        })
    }

    pub fn from_env() -> MediaResult<Self> {
        Self::new(MediaConfig::from_env())
    }

    pub fn config(&self) -> &MediaConfig {
        &self.http.config
    }

    pub fn is_configured(&self) -> bool {
        self.http.config.is_configured()
    }

    /// Account authorization, reused until it expires or is rejected.
    pub async fn authorize(&self) -> MediaResult<AccountAuthorization> {
        self.http.authorize().await
    }

    /// Everything needed to upload `original_file_name` directly to storage.
    pub async fn upload_credentials(
        &self,
        original_file_name: &str,
    ) -> MediaResult<UploadCredentials> {
        if original_file_name.trim().is_empty() {
            return Err(MediaError::InvalidMedia {
                message: "file name must not be empty".to_string(),
            });
        }
        let (bucket_id, bucket_name) = self.http.config.bucket()?;
        let (auth, upload) = self.http.get_upload_url(bucket_id).await?;

        Ok(UploadCredentials {
            upload_url: upload.upload_url,
            auth_token: upload.authorization_token,
            final_file_name: final_file_name(&self.http.config.key_prefix, original_file_name),
            public_file_url_base: format!(
                "{}/file/{}",
                auth.download_url.trim_end_matches('/'),
                bucket_name
            ),
        })
    }

    /// Upload `data` with credentials from [`MediaClient::upload_credentials`].
    pub async fn upload(
        &self,
        credentials: &UploadCredentials,
        data: &[u8],
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<UploadedMedia> {
        let stored = self
            .http
            .upload_file(credentials, data, content_type, progress)
            .await?;
        let media = UploadedMedia {
            file_id: stored.file_id,
            file_name: stored.file_name,
            public_url: credentials.public_url(),
        };
        info!(
            file_id = %media.file_id,
            file_name = %media.file_name,
            bytes = data.len(),
            "media uploaded"
        );
        Ok(media)
    }

    /// Fetch credentials and upload in one go. A rejected or failed upload
    /// is retried once against a fresh upload URL.
    pub async fn upload_bytes(
        &self,
        original_file_name: &str,
        data: &[u8],
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<UploadedMedia> {
        let mut retried = false;
        loop {
            let credentials = self.upload_credentials(original_file_name).await?;
            match self
                .upload(&credentials, data, content_type, progress.clone())
                .await
            {
                Err(e)
                    if !retried
                        && (e.is_retryable() || matches!(e, MediaError::Unauthorized { .. })) =>
                {
                    warn!(error = %e, "upload failed; retrying with a new upload url");
                    retried = true;
                }
                other => return other,
            }
        }
    }

    /// Upload an inline (`data:`) payload and return its public URL.
    /// Remote URLs come back unchanged.
    pub async fn offload_inline(&self, media: &MediaUrl) -> MediaResult<MediaUrl> {
        let MediaUrl::Inline { mime, .. } = media else {
            return Ok(media.clone());
        };
        let data = media.inline_bytes().ok_or_else(|| MediaError::InvalidMedia {
            message: "inline payload is not valid base64".to_string(),
        })?;

        let name = format!("inline.{}", media.extension());
        let uploaded = self.upload_bytes(&name, &data, mime, None).await?;
        MediaUrl::parse(&uploaded.public_url).map_err(|e| MediaError::InvalidResponse {
            message: format!("storage returned an unusable public url: {e}"),
        })
    }

    /// [`MediaClient::offload_inline`] over a list, preserving order.
    pub async fn offload_all(&self, media: &[MediaUrl]) -> MediaResult<Vec<MediaUrl>> {
        let mut out = Vec::with_capacity(media.len());
        for m in media {
            out.push(self.offload_inline(m).await?);
        }
        Ok(out)
    }
}
