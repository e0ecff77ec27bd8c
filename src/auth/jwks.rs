use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tracing::{debug, error};

use super::AuthError;

/// Source of the identity provider's published signing keys
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the JWKS over HTTP on every call. Keys are not cached.
pub struct RemoteJwks {
    client: reqwest::Client,
    url: String,
}

impl RemoteJwks {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                error!("Falling back to default HTTP client for JWKS: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        debug!("Fetching JWKS from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("JWKS request to {} failed: {}", self.url, e);
                AuthError::KeySetUnavailable
            })?;

        response.json::<JwkSet>().await.map_err(|e| {
            error!("JWKS from {} is not a valid key set: {}", self.url, e);
            AuthError::KeySetUnavailable
        })
    }
}

/// Fixed key set, for offline setups and tests
pub struct StaticJwks(JwkSet);

impl StaticJwks {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl KeySource for StaticJwks {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Ok(self.0.clone())
    }
}
