//! JWT claims structure used in ID tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use biblioteca_entity::identity::{IdentityClaims, Principal};
use biblioteca_entity::user::UserRole;

/// JWT claims payload embedded in every ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal ID.
    pub sub: Uuid,
    /// Principal email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Principal display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role custom claim; absent until one is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Claims version: the principal's `claims_updated_at` in microseconds
    /// at issuance. Tokens with an older version are stale.
    pub cv: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// The principal this token was issued to.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            email: self.email.clone(),
            display_name: self.name.clone(),
        }
    }

    /// The custom claims carried by this token.
    pub fn identity_claims(&self) -> IdentityClaims {
        IdentityClaims { role: self.role }
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Whether the claims predate the principal's latest claim change.
    pub fn is_stale(&self, claims_updated_at: DateTime<Utc>) -> bool {
        self.cv < claims_updated_at.timestamp_micros()
    }
}
