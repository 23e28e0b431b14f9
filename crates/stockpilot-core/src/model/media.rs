//! Media URLs attached to products: remote links or inline `data:` payloads.

use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, InventoryResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MediaUrl {
    /// An `http`/`https` URL served elsewhere.
    Remote(url::Url),
    /// A `data:<mime>;base64,<payload>` URL. `data` keeps the base64 text.
    Inline { mime: String, data: String },
}

impl MediaUrl {
    pub fn parse(raw: &str) -> InventoryResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InventoryError::InvalidMedia {
                reason: "empty url".to_string(),
            });
        }

        if let Some(rest) = raw.strip_prefix("data:") {
            return Self::parse_inline(rest);
        }

        let url = url::Url::parse(raw).map_err(|e| InventoryError::InvalidMedia {
            reason: format!("{raw}: {e}"),
        })?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(Self::Remote(url)),
            scheme => Err(InventoryError::InvalidMedia {
                reason: format!("unsupported scheme '{scheme}' in {raw}"),
            }),
        }
    }

    fn parse_inline(rest: &str) -> InventoryResult<Self> {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| InventoryError::InvalidMedia {
                reason: "data url has no payload separator".to_string(),
            })?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| InventoryError::InvalidMedia {
                reason: "only base64 data urls are supported".to_string(),
            })?;
        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };
        if !mime.contains('/') {
            return Err(InventoryError::InvalidMedia {
                reason: format!("invalid mime type '{mime}'"),
            });
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| InventoryError::InvalidMedia {
                reason: format!("invalid base64 payload: {e}"),
            })?;

        Ok(Self::Inline {
            mime: mime.to_ascii_lowercase(),
            data: payload.to_string(),
        })
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Decoded bytes of an inline payload; `None` for remote URLs.
    pub fn inline_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Inline { data, .. } => base64::engine::general_purpose::STANDARD
                .decode(data)
                .ok(),
            Self::Remote(_) => None,
        }
    }

    /// Conventional file extension for the payload type.
    pub fn extension(&self) -> &str {
        match self {
            Self::Inline { mime, .. } => match mime.as_str() {
                "image/png" => "png",
                "image/jpeg" | "image/jpg" => "jpg",
                "image/gif" => "gif",
                "image/webp" => "webp",
                "image/svg+xml" => "svg",
                "video/mp4" => "mp4",
                "video/webm" => "webm",
                "video/quicktime" => "mov",
                _ => "bin",
            },
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext)
                .unwrap_or("bin"),
        }
    }

    /// Whether the asset is a video rather than an image.
    pub fn is_video(&self) -> bool {
        match self {
            Self::Inline { mime, .. } => mime.starts_with("video/"),
            Self::Remote(_) => matches!(self.extension(), "mp4" | "webm" | "mov"),
        }
    }
}

/// A change to a product's media list, applied against the stored list
/// rather than a copy read earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEdit {
    /// Add entries at the end.
    Append(Vec<MediaUrl>),
    /// Swap each `(from, to)` pair wherever `from` still appears.
    Replace(Vec<(MediaUrl, MediaUrl)>),
}

impl MediaEdit {
    pub fn apply(&self, media: &mut Vec<MediaUrl>) {
        match self {
            Self::Append(extra) => media.extend(extra.iter().cloned()),
            Self::Replace(pairs) => {
                for entry in media.iter_mut() {
                    if let Some((_, to)) = pairs.iter().find(|(from, _)| from == entry) {
                        *entry = to.clone();
                    }
                }
            }
        }
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url.as_str()),
            Self::Inline { mime, data } => write!(f, "data:{mime};base64,{data}"),
        }
    }
}

impl TryFrom<String> for MediaUrl {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaUrl> for String {
    fn from(url: MediaUrl) -> Self {
        url.to_string()
    }
}

/// Parse a comma-separated list as typed in the product form.
pub fn parse_media_list(raw: &str) -> InventoryResult<Vec<MediaUrl>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    // a data url carries a comma after its header; only those absorb the next piece
    let mut out = Vec::new();
    let mut current = String::new();
    for part in raw.split(',') {
        let starts_new = {
            let p = part.trim_start();
            p.starts_with("data:") || p.starts_with("http://") || p.starts_with("https://")
        };
        let continues_inline = current.trim_start().starts_with("data:") && !starts_new;
        if !current.is_empty() && !continues_inline {
            out.push(MediaUrl::parse(&current)?);
            current.clear();
        }
        if !current.is_empty() {
            current.push(',');
        }
        current.push_str(part);
    }
    if !current.trim().is_empty() {
        out.push(MediaUrl::parse(&current)?);
    }
    Ok(out)
}
