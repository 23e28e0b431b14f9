//! Account authorization cache.
//!
//! `b2_authorize_account` is rate limited and slow, so one authorization
//! is shared by every clone of the client until it ages out or the
//! storage service rejects it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::AccountAuthorization;

#[derive(Debug, Clone)]
struct CachedAuthorization {
    auth: AccountAuthorization,
    expires_at: DateTime<Utc>,
}

/// Shared, time-limited holder for the current account authorization.
#[derive(Debug, Clone)]
pub struct AuthCache {
    ttl: Duration,
    cached: Arc<RwLock<Option<CachedAuthorization>>>,
}

impl AuthCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1000)),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// The cached authorization, unless it has expired.
    pub async fn get(&self) -> Option<AccountAuthorization> {
        let guard = self.cached.read().await;
        guard
            .as_ref()
            .filter(|c| Utc::now() < c.expires_at)
            .map(|c| c.auth.clone())
    }

    pub async fn store(&self, auth: AccountAuthorization) {
        let expires_at = Utc::now() + self.ttl;
        debug!(account_id = %auth.account_id, %expires_at, "caching account authorization");
        *self.cached.write().await = Some(CachedAuthorization { auth, expires_at });
    }

    /// Forget the authorization so the next call re-authorizes.
    pub async fn clear(&self) {
        *self.cached.write().await = None;
    }
}
