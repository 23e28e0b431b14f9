use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub(crate) fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite file holding the product collection.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Request body cap; inline media travels in JSON bodies.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default)]
    pub log_json: bool,

    /// Upload inline media to object storage before products are saved.
    #[serde(default)]
    pub offload_inline_media: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("stockpilot.db")
}

fn default_max_body_bytes() -> usize {
    8 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            max_body_bytes: default_max_body_bytes(),
            log_json: false,
            offload_inline_media: false,
        }
    }
}

impl ServerConfig {
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `STOCKPILOT_BIND` | Listen address (default: `127.0.0.1:8080`) |
    /// | `STOCKPILOT_DB_PATH` | Product database file (default: `stockpilot.db`) |
    /// | `STOCKPILOT_MAX_BODY_BYTES` | Request body cap (default: 8 MiB) |
    /// | `STOCKPILOT_LOG_JSON` | JSON log lines |
    /// | `STOCKPILOT_OFFLOAD_INLINE_MEDIA` | Upload `data:` media on save |
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_string("STOCKPILOT_BIND").unwrap_or_else(default_bind_addr),
            db_path: env_string("STOCKPILOT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            max_body_bytes: env_usize("STOCKPILOT_MAX_BODY_BYTES", default_max_body_bytes()),
            log_json: env_bool("STOCKPILOT_LOG_JSON", false),
            offload_inline_media: env_bool("STOCKPILOT_OFFLOAD_INLINE_MEDIA", false),
        }
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    pub fn with_offload_inline_media(mut self, enabled: bool) -> Self {
        self.offload_inline_media = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_defaults_and_overrides() {
        env::remove_var("STOCKPILOT_BIND");
        env::set_var("STOCKPILOT_DB_PATH", "/tmp/inv.db");
        env::set_var("STOCKPILOT_MAX_BODY_BYTES", "1024");
        env::set_var("STOCKPILOT_LOG_JSON", "yes");
        env::set_var("STOCKPILOT_OFFLOAD_INLINE_MEDIA", "maybe");

        let cfg = ServerConfig::from_env();

        env::remove_var("STOCKPILOT_DB_PATH");
        env::remove_var("STOCKPILOT_MAX_BODY_BYTES");
        env::remove_var("STOCKPILOT_LOG_JSON");
        env::remove_var("STOCKPILOT_OFFLOAD_INLINE_MEDIA");

        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/inv.db"));
        assert_eq!(cfg.max_body_bytes, 1024);
        assert!(cfg.log_json);
        assert!(!cfg.offload_inline_media, "unparseable bool falls back");
    }
}
