//! Product media storage on Backblaze B2 (native API v2).
//!
//! Files are never proxied through the server: callers ask for
//! [`UploadCredentials`], then send the bytes straight to the storage pod.
//! The CLI uses [`MediaClient::upload_bytes`], which does both steps.
//!
//! ```no_run
//! use stockpilot_media::MediaClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = MediaClient::from_env()?;
//! let creds = client.upload_credentials("red shoe.png").await?;
//! let uploaded = client.upload(&creds, b"...", "image/png", None).await?;
//! println!("{}", uploaded.public_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `BACKBLAZE_B2_APPLICATION_KEY_ID` | Application key id |
//! | `BACKBLAZE_B2_APPLICATION_KEY` | Application key |
//! | `BACKBLAZE_B2_BUCKET_ID` | Bucket uploads go to |
//! | `BACKBLAZE_B2_BUCKET_NAME` | Bucket name, used in public URLs |
//! | `STOCKPILOT_B2_API_URL` | Authorization endpoint (default: `https://api.backblazeb2.com`) |
//! | `STOCKPILOT_B2_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `STOCKPILOT_B2_MAX_RETRIES` | Max retries for transient failures (default: 3) |
//! | `STOCKPILOT_B2_KEY_PREFIX` | Object key prefix (default: `products`) |

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::AuthCache;
pub use client::{sanitize_file_name, MediaClient, ProgressCallback};
pub use error::{MediaError, MediaResult};
pub use types::{
    AccountAuthorization, MediaConfig, UploadCredentials, UploadProgress, UploadedMedia,
};

/// User-Agent sent with every storage request.
pub const MEDIA_USER_AGENT: &str = concat!("stockpilot-media/", env!("CARGO_PKG_VERSION"));
