//! ID token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use biblioteca_core::config::auth::AuthConfig;
use biblioteca_core::error::AppError;
use biblioteca_entity::identity::Identity;

use super::claims::Claims;

/// Creates signed ID tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: config.token_ttl_minutes as i64,
        }
    }

    /// Issue a token carrying the identity's current claims.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::minutes(self.ttl_minutes);

        let claims = Claims {
            sub: identity.id,
            email: Some(identity.email.clone()),
            name: identity.display_name.clone(),
            role: identity.claim_role,
            cv: identity.claims_updated_at.timestamp_micros(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at: exp,
        })
    }
}
