//! ID token validation.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use biblioteca_core::config::auth::AuthConfig;
use biblioteca_core::error::AppError;

use super::claims::Claims;

/// Validates ID tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation for live tokens.
    validation: Validation,
    /// Validation for tokens presented at the refresh endpoint.
    refresh_validation: Validation,
    /// How long after expiry a token may still be refreshed, in seconds.
    refresh_window_seconds: i64,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("refresh_window_seconds", &self.refresh_window_seconds)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock skew

        let mut refresh_validation = Validation::new(Algorithm::HS256);
        refresh_validation.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            refresh_validation,
            refresh_window_seconds: config.refresh_window_hours as i64 * 3600,
        }
    }

    /// Decode a token presented on a regular request.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Decode a token presented for refresh: signature must be valid, and
    /// the token may be expired by at most the refresh window.
    pub fn decode_for_refresh(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.refresh_validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)?;

        if Utc::now().timestamp() > claims.exp + self.refresh_window_seconds {
            return Err(AppError::authentication(
                "Token is too old to refresh; sign in again",
            ));
        }
        Ok(claims)
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AppError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::authentication("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => {
            AppError::authentication("Invalid token format")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::authentication("Invalid token signature")
        }
        _ => AppError::authentication(format!("Token validation failed: {e}")),
    }
}
