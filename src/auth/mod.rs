//! Bearer token authorization against the identity provider's JWKS.
//!
//! [`AuthGuard::requires_auth`] walks the whole check for one request:
//! header parsing, key lookup by `kid`, signature and claim validation,
//! and finally the permission scope.

pub mod error;
pub mod jwks;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::AuthConfig;

pub use error::AuthError;
pub use jwks::{KeySource, RemoteJwks, StaticJwks};

/// Decoded access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct AuthGuard {
    keys: Arc<dyn KeySource>,
    algorithm: Algorithm,
    audience: String,
    issuer: String,
}

impl AuthGuard {
    pub fn new(
        keys: Arc<dyn KeySource>,
        algorithm: Algorithm,
        audience: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            algorithm,
            audience: audience.into(),
            issuer: issuer.into(),
        }
    }

    /// Guard that fetches keys from the configured identity provider
    pub fn from_config(config: &AuthConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let algorithm = Algorithm::from_str(&config.algorithm)?;
        let keys = RemoteJwks::new(config.jwks_url(), Duration::from_secs(config.jwks_timeout_secs));
        Ok(Self::new(Arc::new(keys), algorithm, &config.audience, config.issuer()))
    }

    /// Authorize one request for `permission`, returning the verified claims
    pub async fn requires_auth(&self, headers: &HeaderMap, permission: &str) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.verify_decode(token).await?;
        check_permissions(permission, &claims)?;
        debug!(sub = ?claims.sub, permission, "authorized");
        Ok(claims)
    }

    /// Verify the token signature and registered claims
    pub async fn verify_decode(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedHeader("Authorization malformed."))?;
        let kid = header
            .kid
            .ok_or(AuthError::MalformedHeader("Authorization malformed."))?;

        let jwks = self.keys.fetch().await?;
        let jwk = jwks.find(&kid).ok_or(AuthError::KeyNotFound)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            warn!("JWK '{}' cannot be used for verification: {}", kid, e);
            AuthError::KeyNotFound
        })?;

        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
                _ => {
                    debug!("Token rejected: {}", e);
                    AuthError::InvalidToken
                }
            })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Authorization header must be bearer token."))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        )),
        [] => Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::MalformedHeader("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader("Authorization header must be bearer token.")),
    }
}

pub fn check_permissions(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let granted = claims.permissions.as_ref().ok_or(AuthError::PermissionsMissing)?;
    if granted.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
