//! HTTP layer: status mapping, retry, re-authorization.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::AuthCache;
use crate::error::{MediaError, MediaResult};
use crate::types::{
    AccountAuthorization, MediaConfig, UploadCredentials, UploadFileResponse, UploadProgress,
    UploadUrlResponse,
};

use super::helpers::{encode_file_name, parse_error_body, retry_after};
use super::ProgressCallback;

/// Bytes handed to the transport per progress tick.
pub(crate) const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// HTTP backend for making requests (holds reqwest client, auth cache, config).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) config: MediaConfig,
    pub(crate) auth: AuthCache,
}

impl HttpBackend {
    /// Cached account authorization, or a fresh `b2_authorize_account`.
    pub(crate) async fn authorize(&self) -> MediaResult<AccountAuthorization> {
        if let Some(auth) = self.auth.get().await {
            return Ok(auth);
        }

        let (key_id, key) = self.config.credentials()?;
        let url = format!(
            "{}/b2api/v2/b2_authorize_account",
            self.config.api_url.trim_end_matches('/')
        );
        debug!(url = %url, "authorizing storage account");

        let response = self
            .request(|| self.client.get(&url).basic_auth(key_id, Some(key)))
            .await?;
        let auth: AccountAuthorization = read_json(response, "authorize_account").await?;
        self.auth.store(auth.clone()).await;
        Ok(auth)
    }

    /// `b2_get_upload_url`; a rejected account token is refreshed once.
    pub(crate) async fn get_upload_url(
        &self,
        bucket_id: &str,
    ) -> MediaResult<(AccountAuthorization, UploadUrlResponse)> {
        let mut refreshed = false;
        loop {
            let auth = self.authorize().await?;
            let url = format!(
                "{}/b2api/v2/b2_get_upload_url",
                auth.api_url.trim_end_matches('/')
            );
            debug!(url = %url, bucket_id, "requesting upload url");

            let result = self
                .request(|| {
                    self.client
                        .post(&url)
                        .header(AUTHORIZATION, &auth.authorization_token)
                        .json(&serde_json::json!({ "bucketId": bucket_id }))
                })
                .await;

            match result {
                Ok(response) => {
                    let upload = read_json(response, "get_upload_url").await?;
                    return Ok((auth, upload));
                }
                Err(MediaError::Unauthorized { message }) if !refreshed => {
                    warn!(%message, "account authorization rejected; re-authorizing");
                    self.auth.clear().await;
                    refreshed = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// `b2_upload_file` against a pod URL. Single attempt: the body is
    /// streamed and cannot be replayed, so callers retry with fresh
    /// credentials instead.
    pub(crate) async fn upload_file(
        &self,
        credentials: &UploadCredentials,
        data: &[u8],
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<UploadFileResponse> {
        let total = data.len() as u64;
        let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();

        if let Some(cb) = &progress {
            cb(UploadProgress { sent: 0, total });
        }
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(cb) = &progress {
                cb(UploadProgress { sent, total });
            }
            Ok::<_, std::io::Error>(chunk)
        });

        debug!(
            file_name = %credentials.final_file_name,
            bytes = total,
            content_type,
            "uploading file"
        );
        let response = self
            .client
            .post(&credentials.upload_url)
            .header(AUTHORIZATION, &credentials.auth_token)
            .header("X-Bz-File-Name", encode_file_name(&credentials.final_file_name))
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .header("X-Bz-Content-Sha1", "do_not_verify")
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await?;

        let response = check_status(response).await?;
        read_json(response, "upload_file").await
    }

    /// Send with retry on transient failures.
    pub(crate) async fn request<F>(&self, build: F) -> MediaResult<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        use rand::Rng;

        let mut retries = 0;
        let max_retries = self.config.max_retries;

        loop {
            let result = match build().send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(MediaError::from(e)),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && retries < max_retries => {
                    retries += 1;

                    let backoff = match &e {
                        MediaError::RateLimited {
                            retry_after: Some(retry_after),
                        } => {
                            let capped = (*retry_after).min(Duration::from_secs(30));
                            let base_ms = capped.as_millis() as u64;
                            let jitter_factor: f64 =
                                rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
                            let jittered_ms = ((base_ms as f64) * jitter_factor).round() as u64;
                            Duration::from_millis(jittered_ms.max(100))
                        }
                        _ => {
                            let base_backoff = Duration::from_secs(1 << retries);
                            let base_backoff = base_backoff.min(Duration::from_secs(30));
                            let jittered_ms =
                                rand::thread_rng().gen_range(0..=base_backoff.as_millis() as u64);
                            Duration::from_millis(jittered_ms.max(10))
                        }
                    };

                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis(),
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn check_status(response: reqwest::Response) -> MediaResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let wait = retry_after(response.headers());
    let text = response.text().await.unwrap_or_default();
    let body = parse_error_body(&text, code);
    let message = format!("{}: {}", body.code, body.message);

    Err(match code {
        400 => MediaError::BadRequest {
            code: body.code,
            message: body.message,
        },
        401 => MediaError::Unauthorized { message },
        403 => MediaError::Forbidden { message },
        404 => MediaError::NotFound { message },
        408 => MediaError::Network {
            message: format!("HTTP 408: {message}"),
        },
        429 | 503 => MediaError::RateLimited { retry_after: wait },
        500..=599 => MediaError::Network {
            message: format!("HTTP {code}: {message}"),
        },
        _ => MediaError::BadRequest {
            code: body.code,
            message: body.message,
        },
    })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> MediaResult<T> {
    response
        .json()
        .await
        .map_err(|e| MediaError::InvalidResponse {
            message: format!("failed to parse {what} response: {e}"),
        })
}
