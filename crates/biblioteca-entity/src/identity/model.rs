//! Identity (authentication principal) entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserRole;

/// A sign-in principal with its custom role claim.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Principal identifier, shared with the profile record.
    pub id: Uuid,
    /// Login email, unique case-insensitively.
    pub email: String,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name given at registration.
    pub display_name: Option<String>,
    /// Role custom claim; `None` resolves to `User`.
    pub claim_role: Option<UserRole>,
    /// Last time `claim_role` changed. Tokens issued earlier are stale.
    pub claims_updated_at: DateTime<Utc>,
    /// When the principal was registered.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Project the principal as seen by the identity resolver.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: Some(self.email.clone()),
            display_name: self.display_name.clone(),
        }
    }

    /// The role claims carried by freshly issued tokens.
    pub fn claims(&self) -> IdentityClaims {
        IdentityClaims {
            role: self.claim_role,
        }
    }
}

/// The authenticated principal: who signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier.
    pub id: Uuid,
    /// Email, when known.
    pub email: Option<String>,
    /// Display name, when known.
    pub display_name: Option<String>,
}

/// Signed custom claims attached to the principal's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Role claim, if one has been assigned.
    pub role: Option<UserRole>,
}

/// Data required to register a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIdentity {
    /// Login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Initial role claim.
    pub claim_role: Option<UserRole>,
    /// Claim granted instead of `claim_role` when no other principal
    /// exists yet. Decided in the same write as the insert.
    pub bootstrap_role: Option<UserRole>,
}
