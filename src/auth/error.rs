use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Terminal failure states of the authorization guard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Unable to fetch signing keys.")]
    KeySetUnavailable,

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    #[error("Token expired.")]
    Expired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    InvalidToken,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionDenied,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Machine-readable code for client handling
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader(_) | AuthError::KeyNotFound => "invalid_header",
            AuthError::KeySetUnavailable => "jwks_unavailable",
            AuthError::Expired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::InvalidToken => "invalid_token",
            AuthError::PermissionDenied => "unauthorized",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "success": false,
            "error": self.status_code().as_u16(),
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}
