//! App-only OAuth token caching.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::constants::{TOKEN_EXPIRY_MARGIN, TOKEN_REUSE_WINDOW};

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// A bearer token and the instant it should be considered expired.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: Instant,
}

impl CachedToken {
    /// Whether the token can still be handed out at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now + TOKEN_REUSE_WINDOW
    }
}

/// In-memory holder for the current app token.
///
/// The cache is never locked across a network request. Two callers that both
/// find it stale will both request a token, and the last writer wins.
#[derive(Debug, Default)]
pub struct TokenCache {
    entry: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if it is still fresh.
    pub fn get(&self) -> Option<String> {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|cached| cached.is_fresh(Instant::now()))
            .map(|cached| cached.token.clone())
    }

    /// Store a token issued now with a declared lifetime of `expires_in` seconds.
    pub fn set(&self, token: String, expires_in: u64) {
        let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        self.set_with_expiry(token, Instant::now() + lifetime);
    }

    /// Replace the cache entry unconditionally.
    pub fn set_with_expiry(&self, token: String, expires_at: Instant) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = Some(CachedToken { token, expires_at });
    }

    /// The raw entry, fresh or not.
    pub fn peek(&self) -> Option<CachedToken> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
