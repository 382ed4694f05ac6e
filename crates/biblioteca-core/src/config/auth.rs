//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token issuance and credential policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// ID token TTL in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// How long after expiry a token may still be exchanged at the refresh
    /// endpoint, in hours.
    #[serde(default = "default_refresh_window")]
    pub refresh_window_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4) a new password must reach.
    #[serde(default = "default_password_score")]
    pub password_min_score: u8,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_minutes: default_token_ttl(),
            refresh_window_hours: default_refresh_window(),
            password_min_length: default_password_min(),
            password_min_score: default_password_score(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    60
}

fn default_refresh_window() -> u64 {
    24 * 7
}

fn default_password_min() -> usize {
    8
}

fn default_password_score() -> u8 {
    2
}
