//! Request DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-in credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Token refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The current, possibly expired or stale, token.
    pub token: String,
}

/// Body carrying only a name (folder rename, tag create and rename).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    /// New name.
    pub name: String,
}

/// `?limit=` for the principal listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrincipalsQuery {
    /// Batch size used while listing.
    pub limit: Option<u64>,
}

/// Query string of the document search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search text.
    #[serde(default)]
    pub q: String,
    /// Restrict to a category.
    pub category_id: Option<Uuid>,
    /// Restrict to a tag.
    pub tag_id: Option<Uuid>,
    /// Maximum number of results.
    pub limit: Option<u64>,
}

/// `?token=` on the WebSocket upgrade.
#[derive(Debug, Clone, Deserialize)]
pub struct WsQuery {
    /// ID token.
    pub token: String,
}
