use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthGuard;
use crate::error::ApiError;

/// Middleware state: the guard plus the permission one route demands
#[derive(Clone)]
pub struct RequiredPermission {
    guard: Arc<AuthGuard>,
    permission: &'static str,
}

impl RequiredPermission {
    pub fn new(guard: Arc<AuthGuard>, permission: &'static str) -> Self {
        Self { guard, permission }
    }
}

/// Rejects the request unless its bearer token carries the required permission.
/// On success the decoded [`crate::auth::Claims`] are placed in the request extensions.
pub async fn require_permission(
    State(required): State<RequiredPermission>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = required
        .guard
        .requires_auth(&headers, required.permission)
        .await
        .map_err(|e| {
            tracing::info!(permission = required.permission, code = e.code(), "Authorization failed: {}", e);
            e
        })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
