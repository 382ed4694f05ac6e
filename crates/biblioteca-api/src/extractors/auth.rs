//! `AuthUser` extractor: pulls the ID token from the Authorization header,
//! validates it, and injects the caller's session.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use biblioteca_core::error::AppError;
use biblioteca_service::SessionContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionContext);

impl AuthUser {
    /// Returns the inner `SessionContext`.
    pub fn context(&self) -> &SessionContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = SessionContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let (ip_address, user_agent) = request_info(&parts.headers);
        let ctx = state
            .auth_service
            .session(token)
            .await?
            .with_request_info(ip_address, user_agent);

        Ok(AuthUser(ctx))
    }
}

/// Client IP (first `X-Forwarded-For` hop) and User-Agent.
pub fn request_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    (ip_address, user_agent)
}
