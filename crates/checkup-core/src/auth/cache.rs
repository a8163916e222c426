use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::provider::{AccessToken, CredentialProvider};
use crate::error::CheckupError;

/// Tokens closer than this to expiry are fetched again.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// Caches tokens per credential id in front of another provider.
///
/// Reads share the lock. A miss or a token about to expire takes the write
/// lock and re-checks before calling the inner provider, so concurrent
/// callers trigger a single fetch.
pub struct CachedCredentials<P> {
    inner: P,
    tokens: RwLock<HashMap<String, AccessToken>>,
    refresh_margin: chrono::Duration,
}

impl<P: CredentialProvider> CachedCredentials<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            tokens: RwLock::new(HashMap::new()),
            refresh_margin: chrono::Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }

    fn usable(&self, token: &AccessToken) -> bool {
        !token.expires_within(Utc::now(), self.refresh_margin)
    }
}

#[async_trait]
impl<P: CredentialProvider> CredentialProvider for CachedCredentials<P> {
    async fn authenticate(&self, credential_id: Option<&str>) -> Result<AccessToken, CheckupError> {
        let Some(id) = credential_id else {
            return self.inner.authenticate(None).await;
        };

        if let Some(token) = self.tokens.read().await.get(id) {
            if self.usable(token) {
                return Ok(token.clone());
            }
        }

        let mut tokens = self.tokens.write().await;
        if let Some(token) = tokens.get(id) {
            if self.usable(token) {
                return Ok(token.clone());
            }
        }

        debug!(credential_id = id, "fetching token");
        let token = self.inner.authenticate(Some(id)).await?;
        tokens.insert(id.to_string(), token.clone());
        Ok(token)
    }
}
