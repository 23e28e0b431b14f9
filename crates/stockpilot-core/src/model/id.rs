//! Product identifiers in the document-database object id shape.
//!
//! Layout (12 bytes, rendered as 24 lowercase hex chars):
//! - 4 bytes: seconds since the Unix epoch, big-endian
//! - 5 bytes: per-process random value
//! - 3 bytes: counter, big-endian, starting at a random value

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, InventoryResult};

const ID_BYTES: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Mint a new id. Ids minted by one process sort by creation second.
    pub fn generate() -> Self {
        let secs = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let unique = PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen());
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..=COUNTER_MASK)))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(hex::encode(bytes))
    }

    /// Parse a user-supplied id, normalizing hex case.
    pub fn parse(raw: &str) -> InventoryResult<Self> {
        let trimmed = raw.trim();
        if trimmed.len() != ID_BYTES * 2 || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InventoryError::InvalidId {
                id: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = u32::from_str_radix(&self.0[..8], 16).unwrap_or(0);
        chrono::DateTime::from_timestamp(secs as i64, 0).unwrap_or_default()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductId {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ProductId {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
