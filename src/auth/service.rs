/// Authentication service
///
/// The surface the HTTP layer talks to: registration, credential login,
/// refresh rotation, and policy checks over presented access tokens. Owns
/// an injected credential store handle; no ambient globals.

use std::sync::Arc;

use crate::auth::claims::TokenClaims;
use crate::auth::guard::{authorize, Policy};
use crate::auth::issuer::{TokenIssuer, TokenPair};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::rotation::RefreshRotator;
use crate::auth::token::TokenCodec;
use crate::configuration::JwtSettings;
use crate::error::AuthError;
use crate::principal::{Principal, Role};
use crate::store::CredentialStore;
use crate::validators::{is_valid_email, is_valid_username};

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
    issuer: TokenIssuer,
    rotator: RefreshRotator,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: &JwtSettings) -> Self {
        let codec = TokenCodec::new(config);
        let issuer = TokenIssuer::new(codec.clone(), store.clone(), config);
        let rotator = RefreshRotator::new(codec.clone(), issuer.clone(), store.clone());

        Self {
            store,
            codec,
            issuer,
            rotator,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new principal with the default `regular` role.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let username = is_valid_username(username)?;
        let email = is_valid_email(email)?;
        let password_hash = hash_password(password)?;

        let principal = Principal::new(username, email, password_hash, Role::Regular);
        self.store.insert(&principal).await?;

        tracing::info!(username = %principal.username, "Principal registered");
        Ok(principal)
    }

    /// Authenticate by username or email and mint a token pair.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AuthError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let principal = self
            .store
            .find(identifier.trim())
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !verify_password(password, &principal.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(username = %principal.username, "Login succeeded");
        self.issuer.issue(&principal).await
    }

    /// Validate a presented refresh token and rotate it for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.rotator.rotate(refresh_token).await
    }

    /// Decode an access token and check it against a policy, returning the
    /// claims when both pass. Stateless: no store lookup is involved, so
    /// decisions reflect the role snapshot taken at issuance.
    pub fn authorize(
        &self,
        access_token: &str,
        policy: &Policy<'_>,
    ) -> Result<TokenClaims, AuthError> {
        if access_token.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let claims = self.codec.decode(access_token.trim())?;

        if !authorize(&claims, policy) {
            return Err(AuthError::Unauthorized);
        }

        Ok(claims)
    }

    pub async fn update_role(&self, username: &str, role: Role) -> Result<(), AuthError> {
        if self.store.update_role(username, role).await? {
            tracing::info!(username = %username, role = %role, "Role updated");
            Ok(())
        } else {
            Err(AuthError::PrincipalNotFound)
        }
    }

    /// Delete a principal. The stored refresh hash disappears with the
    /// record, which implicitly invalidates any outstanding refresh token.
    pub async fn delete(&self, username: &str) -> Result<(), AuthError> {
        if self.store.delete(username).await? {
            tracing::info!(username = %username, "Principal deleted");
            Ok(())
        } else {
            Err(AuthError::PrincipalNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCredentialStore;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryCredentialStore::new()), &test_settings())
    }

    #[tokio::test]
    async fn test_register_rejects_bad_inputs() {
        let svc = service();

        assert!(matches!(
            svc.register("ab", "alice@example.com", "CorrectHorse1").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            svc.register("alice", "not-an-email", "CorrectHorse1").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            svc.register("alice", "alice@example.com", "weak").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_assigns_regular_role() {
        let svc = service();
        let principal = svc
            .register("alice", "alice@example.com", "CorrectHorse1")
            .await
            .unwrap();
        assert_eq!(principal.role, Role::Regular);
        assert!(principal.refresh_hash.is_none());
    }

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let svc = service();
        svc.register("alice", "alice@example.com", "CorrectHorse1")
            .await
            .unwrap();

        assert!(svc.login("alice", "CorrectHorse1").await.is_ok());
        assert!(svc.login("alice@example.com", "CorrectHorse1").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_error_kinds() {
        let svc = service();
        svc.register("alice", "alice@example.com", "CorrectHorse1")
            .await
            .unwrap();

        assert!(matches!(
            svc.login("", "pw").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            svc.login("nobody", "CorrectHorse1").await,
            Err(AuthError::PrincipalNotFound)
        ));
        assert!(matches!(
            svc.login("alice", "WrongPassword1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authorize_maps_policy_failure() {
        let svc = service();
        svc.register("alice", "alice@example.com", "CorrectHorse1")
            .await
            .unwrap();
        let pair = svc.login("alice", "CorrectHorse1").await.unwrap();

        let claims = svc
            .authorize(&pair.access_token, &Policy::AnyAuthenticated)
            .unwrap();
        assert_eq!(claims.sub, "alice");

        assert!(matches!(
            svc.authorize(&pair.access_token, &Policy::RoleIn(&[Role::Admin])),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            svc.authorize("", &Policy::AnyAuthenticated),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            svc.authorize("junk", &Policy::AnyAuthenticated),
            Err(AuthError::TokenMalformed)
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access_token_for_role_policies() {
        let svc = service();
        svc.register("alice", "alice@example.com", "CorrectHorse1")
            .await
            .unwrap();
        let pair = svc.login("alice", "CorrectHorse1").await.unwrap();

        // The refresh token decodes fine but carries no role
        assert!(matches!(
            svc.authorize(&pair.refresh_token, &Policy::RoleIn(&[Role::Regular])),
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_principal() {
        let svc = service();
        assert!(matches!(
            svc.delete("ghost").await,
            Err(AuthError::PrincipalNotFound)
        ));
    }
}
