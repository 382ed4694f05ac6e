//! Password policy enforcement for new passwords.

use biblioteca_core::config::auth::AuthConfig;
use biblioteca_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Minimum zxcvbn score.
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score.min(4),
        }
    }

    /// Validates a password. `user_inputs` (email, display name) are
    /// penalized by the strength estimator when they appear in the password.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if u8::from(estimate.score()) < self.min_score {
            return Err(AppError::validation(
                "Password is too weak. Please use a longer or less predictable password.",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_too_short() {
        assert!(validator().validate("aB3$", &[]).is_err());
    }

    #[test]
    fn test_common_password_rejected() {
        assert!(validator().validate("password", &[]).is_err());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validator().validate("correct horse battery staple", &[]).is_ok());
    }
}
