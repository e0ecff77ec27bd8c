// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;

/// HTTP API error mapped onto the `{success, error, message}` envelope
#[derive(Debug)]
pub enum ApiError {
    // 404 Not Found
    NotFound,

    // 422 Unprocessable Entity (missing fields, bad recipe, persistence failures)
    Unprocessable,

    // 401 / 403 / 400 from the authorization guard
    Auth(AuthError),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(err) => err.status_code(),
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::NotFound => "Resources Not Found".to_string(),
            ApiError::Unprocessable => "unprocessable".to_string(),
            ApiError::Auth(err) => err.to_string(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Auth(err) => err.to_json(),
            _ => json!({
                "success": false,
                "error": self.status_code().as_u16(),
                "message": self.message(),
            }),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        // The cause is logged only; clients always see the generic 422
        match &err {
            DatabaseError::Conflict(msg) | DatabaseError::Constraint(msg) => {
                tracing::warn!("Rejected write: {}", msg);
            }
            other => tracing::error!("Database error: {}", other),
        }
        ApiError::Unprocessable
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes() {
        assert_eq!(
            ApiError::Unprocessable.to_json(),
            json!({"success": false, "error": 422, "message": "unprocessable"})
        );
        assert_eq!(
            ApiError::NotFound.to_json(),
            json!({"success": false, "error": 404, "message": "Resources Not Found"})
        );
    }

    #[test]
    fn database_errors_become_unprocessable() {
        let err: ApiError = DatabaseError::Conflict("title".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let err: ApiError = DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn auth_errors_keep_their_status() {
        let err: ApiError = AuthError::PermissionDenied.into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_json()["code"], "unauthorized");
    }
}
