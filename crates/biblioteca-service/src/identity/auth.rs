//! Registration, sign-in, token refresh, and request authentication.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::ValidateEmail;

use biblioteca_auth::jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
use biblioteca_auth::password::{PasswordHasher, PasswordValidator};
use biblioteca_core::config::auth::AuthConfig;
use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_database::store::IdentityStore;
use biblioteca_entity::identity::{CreateIdentity, Identity};
use biblioteca_entity::user::UserRole;

use crate::context::SessionContext;

use super::resolver::{IdentityResolver, ResolvedIdentity};

/// Request to register a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Email address, unique ignoring case.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Optional display name.
    pub display_name: Option<String>,
}

/// A signed token together with the resolved identity it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The signed ID token.
    pub token: IssuedToken,
    /// Role and profile after resolution.
    pub identity: ResolvedIdentity,
}

/// Password authentication and token lifecycle.
#[derive(Debug, Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    resolver: IdentityResolver,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        resolver: IdentityResolver,
        config: &AuthConfig,
    ) -> Self {
        Self {
            identities,
            resolver,
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(config),
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        }
    }

    /// Register a principal. The very first principal receives the
    /// `Admin` claim; everyone else starts without a claim.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthSession> {
        let email = normalize_email(&req.email)?;
        let display_name = req
            .display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if display_name.as_ref().is_some_and(|n| n.chars().count() > 100) {
            return Err(AppError::validation(
                "Display name must be at most 100 characters",
            ));
        }

        let mut user_inputs = vec![email.as_str()];
        if let Some(name) = display_name.as_deref() {
            user_inputs.push(name);
        }
        self.validator.validate(&req.password, &user_inputs)?;

        if self.identities.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let identity = self
            .identities
            .create(&CreateIdentity {
                email,
                password_hash,
                display_name,
                claim_role: None,
                bootstrap_role: Some(UserRole::Admin),
            })
            .await?;

        info!(
            user_id = %identity.id,
            bootstrap_admin = identity.claim_role.is_some(),
            "Principal registered"
        );

        self.open_session(&identity).await
    }

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let invalid = || AppError::authentication("Invalid email or password");
        let email = email.trim().to_lowercase();

        let identity = self
            .identities
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify_password(password, &identity.password_hash)? {
            warn!(user_id = %identity.id, "Login failed: wrong password");
            return Err(invalid());
        }

        info!(user_id = %identity.id, "Login successful");
        self.open_session(&identity).await
    }

    /// Re-issue a token with the principal's current claims. Stale and
    /// recently expired tokens are accepted.
    pub async fn refresh(&self, token: &str) -> AppResult<AuthSession> {
        let claims = self.decoder.decode_for_refresh(token)?;
        let identity = self.load_identity(&claims).await?;
        self.open_session(&identity).await
    }

    /// Validate a token presented on a request: signature, expiry, that
    /// the principal still exists, and that its claims are current.
    pub async fn authenticate(&self, token: &str) -> AppResult<(Claims, Identity)> {
        let claims = self.decoder.decode(token)?;
        let identity = self.load_identity(&claims).await?;
        if claims.is_stale(identity.claims_updated_at) {
            return Err(AppError::authentication("Token claims are out of date"));
        }
        Ok((claims, identity))
    }

    /// Authenticate a token and resolve it into a session context.
    pub async fn session(&self, token: &str) -> AppResult<SessionContext> {
        let (claims, _) = self.authenticate(token).await?;
        let resolved = self
            .resolver
            .resolve(&claims.principal(), &claims.identity_claims())
            .await?;
        Ok(SessionContext::new(
            claims.user_id(),
            resolved.role,
            claims.role,
            claims.name.clone().or(resolved.profile.display_name),
            claims.email.clone(),
        ))
    }

    /// The resolved identity behind a session.
    pub async fn me(&self, ctx: &SessionContext) -> AppResult<ResolvedIdentity> {
        let identity = self
            .identities
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        self.resolver
            .resolve(&identity.principal(), &identity.claims())
            .await
    }

    async fn open_session(&self, identity: &Identity) -> AppResult<AuthSession> {
        let resolved = self
            .resolver
            .resolve(&identity.principal(), &identity.claims())
            .await?;
        let token = self.encoder.issue(identity)?;
        Ok(AuthSession {
            token,
            identity: resolved,
        })
    }

    async fn load_identity(&self, claims: &Claims) -> AppResult<Identity> {
        self.identities
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("Principal no longer exists"))
    }
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(AppError::validation("A valid email address is required"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblioteca_core::error::ErrorKind;
    use biblioteca_core::events::EventBus;
    use biblioteca_database::DataStore;

    const PASSWORD: &str = "lectura-silenciosa-42";

    fn service(store: &DataStore) -> AuthService {
        let config = AuthConfig {
            jwt_secret: "test-secret-with-enough-entropy".into(),
            ..Default::default()
        };
        let resolver = IdentityResolver::new(store.profiles.clone(), EventBus::default());
        AuthService::new(store.identities.clone(), resolver, &config)
    }

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: PASSWORD.into(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_first_registration_is_admin() {
        let store = DataStore::memory();
        let auth = service(&store);

        let first = auth.register(register("First@Uni.edu")).await.unwrap();
        let second = auth.register(register("second@uni.edu")).await.unwrap();

        assert_eq!(first.identity.role, UserRole::Admin);
        assert_eq!(first.identity.profile.email.as_deref(), Some("first@uni.edu"));
        assert_eq!(second.identity.role, UserRole::User);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_registrations_grant_one_admin() {
        let store = DataStore::memory();
        let auth = service(&store);

        let tasks: Vec<_> = (0..6)
            .map(|i| {
                let auth = auth.clone();
                tokio::spawn(async move { auth.register(register(&format!("r{i}@uni.edu"))).await })
            })
            .collect();
        let mut roles = Vec::new();
        for task in tasks {
            roles.push(task.await.unwrap().unwrap().identity.role);
        }

        assert_eq!(roles.iter().filter(|r| **r == UserRole::Admin).count(), 1);
        assert_eq!(roles.iter().filter(|r| **r == UserRole::User).count(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = DataStore::memory();
        let auth = service(&store);
        auth.register(register("ana@uni.edu")).await.unwrap();
        let err = auth.register(register("ANA@uni.edu")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_invalid_registration_input() {
        let store = DataStore::memory();
        let auth = service(&store);
        let err = auth.register(register("not-an-email")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut weak = register("weak@uni.edu");
        weak.password = "12345678".into();
        let err = auth.register(weak).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_login_and_session() {
        let store = DataStore::memory();
        let auth = service(&store);
        auth.register(register("ana@uni.edu")).await.unwrap();

        let err = auth.login("ana@uni.edu", "wrong-password").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        let err = auth.login("nobody@uni.edu", PASSWORD).await.unwrap_err();
        assert_eq!(err.message, "Invalid email or password");

        let session = auth.login(" ANA@uni.edu ", PASSWORD).await.unwrap();
        let ctx = auth.session(&session.token.token).await.unwrap();
        assert_eq!(ctx.role, UserRole::Admin);
        assert_eq!(ctx.claim_role, Some(UserRole::Admin));
        assert_eq!(ctx.email.as_deref(), Some("ana@uni.edu"));
    }

    #[tokio::test]
    async fn test_claim_change_makes_token_stale_until_refresh() {
        let store = DataStore::memory();
        let auth = service(&store);
        auth.register(register("admin@uni.edu")).await.unwrap();
        let user = auth.register(register("luis@uni.edu")).await.unwrap();
        let token = user.token.token;
        let user_id = user.identity.profile.id;

        store.identities.set_claim_role(user_id, UserRole::Editor).await.unwrap();

        let err = auth.session(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Token claims are out of date");

        let refreshed = auth.refresh(&token).await.unwrap();
        assert_eq!(refreshed.identity.role, UserRole::Editor);
        let ctx = auth.session(&refreshed.token.token).await.unwrap();
        assert_eq!(ctx.role, UserRole::Editor);
    }
}
