//! Pure helpers: object keys, header encoding, error bodies.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use uuid::Uuid;

use crate::types::StorageErrorBody;

/// Replace every char outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<prefix>/<uuid>-<sanitized base>.<ext>`; the extension is whatever
/// follows the last dot, and is left off when there is none.
pub(crate) fn final_file_name(prefix: &str, original: &str) -> String {
    let original = original.trim();
    let (base, ext) = match original.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (base, Some(ext)),
        _ => (original, None),
    };

    let id = Uuid::new_v4();
    let name = match ext {
        Some(ext) => format!(
            "{id}-{}.{}",
            sanitize_file_name(base),
            sanitize_file_name(ext)
        ),
        None => format!("{id}-{}", sanitize_file_name(base)),
    };

    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

/// Percent-encode a key for `X-Bz-File-Name`; `/` stays literal.
pub(crate) fn encode_file_name(name: &str) -> String {
    urlencoding::encode(name).replace("%2F", "/")
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Parse `{"status", "code", "message"}`; fall back to the raw text.
pub(crate) fn parse_error_body(body: &str, status: u16) -> StorageErrorBody {
    match serde_json::from_str::<StorageErrorBody>(body) {
        Ok(parsed) if !parsed.code.is_empty() || !parsed.message.is_empty() => parsed,
        _ => StorageErrorBody {
            code: format!("http_{status}"),
            message: if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().to_string()
            },
        },
    }
}
