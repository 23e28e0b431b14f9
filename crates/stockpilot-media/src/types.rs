//! Configuration and wire types for the storage API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Storage client configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Application key id.
    #[serde(default)]
    pub key_id: Option<String>,

    /// Application key secret.
    #[serde(default)]
    pub application_key: Option<String>,

    #[serde(default)]
    pub bucket_id: Option<String>,

    /// Used to build public download URLs.
    #[serde(default)]
    pub bucket_name: Option<String>,

    /// Where `b2_authorize_account` lives; every later call uses the
    /// `apiUrl` it returns.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Folder uploaded objects are placed under.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// How long an account authorization is reused.
    #[serde(default = "default_auth_ttl")]
    pub auth_ttl_secs: u64,
}

fn default_api_url() -> String {
    "https://api.backblazeb2.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_key_prefix() -> String {
    "products".to_string()
}

fn default_auth_ttl() -> u64 {
    20 * 60 * 60
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            key_id: None,
            application_key: None,
            bucket_id: None,
            bucket_name: None,
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            key_prefix: default_key_prefix(),
            auth_ttl_secs: default_auth_ttl(),
        }
    }
}

impl fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaConfig")
            .field("key_id", &self.key_id)
            .field(
                "application_key",
                &self.application_key.as_ref().map(|_| "<redacted>"),
            )
            .field("bucket_id", &self.bucket_id)
            .field("bucket_name", &self.bucket_name)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("key_prefix", &self.key_prefix)
            .field("auth_ttl_secs", &self.auth_ttl_secs)
            .finish()
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl MediaConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `BACKBLAZE_B2_APPLICATION_KEY_ID` | Application key id |
    /// | `BACKBLAZE_B2_APPLICATION_KEY` | Application key |
    /// | `BACKBLAZE_B2_BUCKET_ID` | Target bucket id |
    /// | `BACKBLAZE_B2_BUCKET_NAME` | Target bucket name |
    /// | `STOCKPILOT_B2_API_URL` | Authorization endpoint base |
    /// | `STOCKPILOT_B2_TIMEOUT` | Request timeout in seconds (default: 30) |
    /// | `STOCKPILOT_B2_MAX_RETRIES` | Retries for transient failures (default: 3) |
    /// | `STOCKPILOT_B2_KEY_PREFIX` | Object key prefix (default: `products`) |
    pub fn from_env() -> Self {
        Self {
            key_id: env_nonempty("BACKBLAZE_B2_APPLICATION_KEY_ID"),
            application_key: env_nonempty("BACKBLAZE_B2_APPLICATION_KEY"),
            bucket_id: env_nonempty("BACKBLAZE_B2_BUCKET_ID"),
            bucket_name: env_nonempty("BACKBLAZE_B2_BUCKET_NAME"),
            api_url: env_nonempty("STOCKPILOT_B2_API_URL").unwrap_or_else(default_api_url),
            timeout_secs: std::env::var("STOCKPILOT_B2_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            max_retries: std::env::var("STOCKPILOT_B2_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_retries),
            key_prefix: env_nonempty("STOCKPILOT_B2_KEY_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(default_key_prefix),
            auth_ttl_secs: default_auth_ttl(),
        }
    }

    /// Set the application key pair.
    pub fn with_credentials(
        mut self,
        key_id: impl Into<String>,
        application_key: impl Into<String>,
    ) -> Self {
        self.key_id = Some(key_id.into());
        self.application_key = Some(application_key.into());
        self
    }

    /// Set the target bucket.
    pub fn with_bucket(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.bucket_id = Some(id.into());
        self.bucket_name = Some(name.into());
        self
    }

    /// Set the authorization endpoint base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_auth_ttl_secs(mut self, secs: u64) -> Self {
        self.auth_ttl_secs = secs;
        self
    }

    /// Everything needed to upload is present.
    pub fn is_configured(&self) -> bool {
        self.key_id.is_some()
            && self.application_key.is_some()
            && self.bucket_id.is_some()
            && self.bucket_name.is_some()
    }

    pub(crate) fn credentials(&self) -> MediaResult<(&str, &str)> {
        match (self.key_id.as_deref(), self.application_key.as_deref()) {
            (Some(id), Some(key)) => Ok((id, key)),
            _ => Err(MediaError::config(
                "BACKBLAZE_B2_APPLICATION_KEY_ID and BACKBLAZE_B2_APPLICATION_KEY must be set",
            )),
        }
    }

    pub(crate) fn bucket(&self) -> MediaResult<(&str, &str)> {
        match (self.bucket_id.as_deref(), self.bucket_name.as_deref()) {
            (Some(id), Some(name)) => Ok((id, name)),
            _ => Err(MediaError::config(
                "BACKBLAZE_B2_BUCKET_ID and BACKBLAZE_B2_BUCKET_NAME must be set",
            )),
        }
    }
}

/// Result of `b2_authorize_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAuthorization {
    pub account_id: String,
    pub authorization_token: String,
    pub api_url: String,
    pub download_url: String,
    #[serde(default)]
    pub recommended_part_size: Option<u64>,
}

/// Result of `b2_get_upload_url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadUrlResponse {
    pub upload_url: String,
    pub authorization_token: String,
}

/// Result of `b2_upload_file`; only the fields we use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadFileResponse {
    pub file_id: String,
    pub file_name: String,
}

/// Error body returned by every storage endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StorageErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// What a browser (or the CLI) needs to upload one file directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCredentials {
    pub upload_url: String,
    pub auth_token: String,
    /// Object key the upload must use.
    pub final_file_name: String,
    /// `{downloadUrl}/file/{bucketName}`; append `/{finalFileName}`.
    pub public_file_url_base: String,
}

impl UploadCredentials {
    pub fn public_url(&self) -> String {
        format!("{}/{}", self.public_file_url_base, self.final_file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Whole percent sent; an empty upload counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub file_id: String,
    pub file_name: String,
    pub public_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let cfg = MediaConfig::default().with_credentials("kid", "super-secret");
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("kid"));
        assert!(!dbg.contains("super-secret"));
    }

    #[test]
    fn test_is_configured_requires_all_four() {
        let cfg = MediaConfig::default().with_credentials("kid", "key");
        assert!(!cfg.is_configured());
        assert!(matches!(cfg.bucket(), Err(MediaError::Config { .. })));
        assert!(cfg.with_bucket("bid", "bucket").is_configured());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(UploadProgress { sent: 0, total: 0 }.percent(), 100);
        assert_eq!(UploadProgress { sent: 50, total: 200 }.percent(), 25);
        assert_eq!(UploadProgress { sent: 200, total: 200 }.percent(), 100);
    }

    #[test]
    fn test_public_url_joins_base_and_key() {
        let creds = UploadCredentials {
            upload_url: "https://pod/upload".into(),
            auth_token: "t".into(),
            final_file_name: "products/abc-shoe.png".into(),
            public_file_url_base: "https://f002.example/file/shop".into(),
        };
        assert_eq!(
            creds.public_url(),
            "https://f002.example/file/shop/products/abc-shoe.png"
        );
    }
}
