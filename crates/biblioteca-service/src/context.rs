//! Session context carrying the authenticated principal and resolved role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use biblioteca_entity::user::{UserRole, model::actor_label};

/// Context for the current authenticated request.
///
/// Built by the authentication layer from the identity resolver and
/// passed into every service method, so each operation knows who is
/// acting and with which role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// The authenticated principal's ID.
    pub user_id: Uuid,
    /// The resolved role.
    pub role: UserRole,
    /// The role custom claim carried by the caller's token.
    pub claim_role: Option<UserRole>,
    /// Display name, when known.
    pub display_name: Option<String>,
    /// Email, when known.
    pub email: Option<String>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(
        user_id: Uuid,
        role: UserRole,
        claim_role: Option<UserRole>,
        display_name: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            claim_role,
            display_name,
            email,
            ip_address: None,
            user_agent: None,
            request_time: Utc::now(),
        }
    }

    /// The operator context used by the admin CLI.
    pub fn system() -> Self {
        Self::new(
            Uuid::nil(),
            UserRole::Admin,
            Some(UserRole::Admin),
            Some("system".to_string()),
            None,
        )
    }

    /// Attach request metadata.
    pub fn with_request_info(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name recorded in the audit log for this caller.
    pub fn actor_label(&self) -> String {
        actor_label(self.display_name.as_deref(), self.email.as_deref())
    }
}
