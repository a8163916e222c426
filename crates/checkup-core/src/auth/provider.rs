use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::CheckupError;

/// Bearer token used for every Checks API request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    /// `None` when the issuer did not say; such tokens are never refreshed.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// True when the token is expired or will be within `margin` of `now`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now + margin,
            None => false,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Resolves a stored credential into a bearer token.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Fails with `MissingCredentials` when `credential_id` is unset or
    /// cannot be resolved.
    async fn authenticate(&self, credential_id: Option<&str>) -> Result<AccessToken, CheckupError>;
}

/// Where `SecretStoreProvider` looks secrets up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// The credential id names an environment variable.
    Environment,
    /// The credential id names a file inside this directory.
    Directory(PathBuf),
}

/// Reads the bearer token from a secrets store keyed by credential id.
#[derive(Debug, Clone)]
pub struct SecretStoreProvider {
    source: SecretSource,
}

impl SecretStoreProvider {
    pub fn new(source: SecretSource) -> Self {
        Self { source }
    }

    async fn lookup(&self, id: &str) -> Result<Option<String>, CheckupError> {
        match &self.source {
            SecretSource::Environment => Ok(std::env::var(id).ok()),
            SecretSource::Directory(dir) => {
                if id.contains(['/', '\\']) || id == ".." || id == "." {
                    return Err(CheckupError::Auth(format!("invalid credential id `{id}`")));
                }
                let path = dir.join(id);
                match tokio::fs::read_to_string(&path).await {
                    Ok(secret) => Ok(Some(secret)),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(err) => Err(CheckupError::Auth(format!(
                        "cannot read {}: {err}",
                        path.display()
                    ))),
                }
            }
        }
    }
}

#[async_trait]
impl CredentialProvider for SecretStoreProvider {
    async fn authenticate(&self, credential_id: Option<&str>) -> Result<AccessToken, CheckupError> {
        let Some(id) = credential_id.filter(|id| !id.trim().is_empty()) else {
            return Err(CheckupError::MissingCredentials(
                "no credential id configured".into(),
            ));
        };

        let secret = self.lookup(id).await?.unwrap_or_default();
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(CheckupError::MissingCredentials(format!(
                "credential `{id}` is not set"
            )));
        }

        debug!(credential_id = id, "resolved credential");
        Ok(AccessToken::new(secret))
    }
}
