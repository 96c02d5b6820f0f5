/// Refresh token rotation
///
/// Validates a presented refresh token and replaces it with a fresh pair.
/// Checks run in a fixed order, short-circuiting on the first failure:
/// presence, signature, expiry, stored-hash match. Once a rotation lands,
/// the superseded token's hash no longer matches anything stored, so a
/// replayed old token is rejected even while its signature and expiry are
/// still technically valid.
///
/// Two near-simultaneous rotations of the same token can both pass the
/// checks before either writes; the last write wins and the loser's pair
/// is invalidated on its next use. The hash write itself is a single
/// atomic store operation, so the field can never hold a partial value.

use std::sync::Arc;

use crate::auth::issuer::{hash_refresh_token, TokenIssuer, TokenPair};
use crate::auth::token::TokenCodec;
use crate::error::AuthError;
use crate::store::CredentialStore;

/// Byte-for-byte comparison without early exit, so the compare time leaks
/// nothing about where two hashes diverge.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Clone)]
pub struct RefreshRotator {
    codec: TokenCodec,
    issuer: TokenIssuer,
    store: Arc<dyn CredentialStore>,
}

impl RefreshRotator {
    pub fn new(codec: TokenCodec, issuer: TokenIssuer, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            codec,
            issuer,
            store,
        }
    }

    pub async fn rotate(&self, presented: &str) -> Result<TokenPair, AuthError> {
        if presented.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        // Signature first, expiry separately: a forged token is rejected
        // regardless of timestamps, while an expired-but-genuine one must
        // surface as expired rather than invalid.
        let claims = self.codec.decode_allow_expired(presented)?;

        if claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        let stored_hash = self
            .store
            .get_refresh_hash(&claims.sub)
            .await?
            .ok_or(AuthError::RefreshMismatch)?;

        let presented_hash = hash_refresh_token(presented);
        if !constant_time_eq(presented_hash.as_bytes(), stored_hash.as_bytes()) {
            tracing::warn!(username = %claims.sub, "Superseded or revoked refresh token presented");
            return Err(AuthError::RefreshMismatch);
        }

        // Re-fetch for a fresh role snapshot; a role change since the last
        // issuance takes effect on this rotation.
        let principal = self
            .store
            .find(&claims.sub)
            .await?
            .ok_or(AuthError::RefreshMismatch)?;

        self.issuer.issue(&principal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::TokenClaims;
    use crate::auth::password::hash_password;
    use crate::configuration::JwtSettings;
    use crate::principal::{Principal, Role};
    use crate::store::InMemoryCredentialStore;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    struct Fixture {
        codec: TokenCodec,
        issuer: TokenIssuer,
        rotator: RefreshRotator,
        store: Arc<InMemoryCredentialStore>,
    }

    async fn fixture() -> Fixture {
        let settings = test_settings();
        let store = Arc::new(InMemoryCredentialStore::new());
        let principal = Principal::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            hash_password("CorrectHorse1").unwrap(),
            Role::Regular,
        );
        store.insert(&principal).await.unwrap();

        let codec = TokenCodec::new(&settings);
        let issuer = TokenIssuer::new(codec.clone(), store.clone(), &settings);
        let rotator = RefreshRotator::new(codec.clone(), issuer.clone(), store.clone());

        Fixture {
            codec,
            issuer,
            rotator,
            store,
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"abc", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }

    #[tokio::test]
    async fn test_missing_token_rejected_first() {
        let f = fixture().await;
        assert!(matches!(
            f.rotator.rotate("").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            f.rotator.rotate("   ").await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_malformed() {
        let f = fixture().await;
        assert!(matches!(
            f.rotator.rotate("not-a-token").await,
            Err(AuthError::TokenMalformed)
        ));
    }

    #[tokio::test]
    async fn test_forged_token_rejected_regardless_of_timestamps() {
        let f = fixture().await;
        let foreign = TokenCodec::new(&JwtSettings {
            secret: "a-completely-different-signing-secret-here".to_string(),
            ..test_settings()
        });
        let forged = foreign
            .encode(&TokenClaims::refresh("alice", 604800, "test"))
            .unwrap();

        assert!(matches!(
            f.rotator.rotate(&forged).await,
            Err(AuthError::TokenBadSignature)
        ));
    }

    #[tokio::test]
    async fn test_expired_genuine_token_reports_expired() {
        let f = fixture().await;
        // Correctly signed, past exp: must be Expired, never mismatch or
        // bad signature, even though its hash matches nothing stored.
        let expired = f
            .codec
            .encode(&TokenClaims::refresh("alice", -120, "test"))
            .unwrap();

        assert!(matches!(
            f.rotator.rotate(&expired).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_unknown_subject_rejected_as_mismatch() {
        let f = fixture().await;
        let token = f
            .codec
            .encode(&TokenClaims::refresh("ghost", 604800, "test"))
            .unwrap();

        assert!(matches!(
            f.rotator.rotate(&token).await,
            Err(AuthError::RefreshMismatch)
        ));
    }

    #[tokio::test]
    async fn test_valid_signature_without_stored_hash_rejected() {
        let f = fixture().await;
        // alice exists but never logged in, so no hash is stored
        let token = f
            .codec
            .encode(&TokenClaims::refresh("alice", 604800, "test"))
            .unwrap();

        assert!(matches!(
            f.rotator.rotate(&token).await,
            Err(AuthError::RefreshMismatch)
        ));
    }

    #[tokio::test]
    async fn test_rotation_supersedes_previous_token() {
        let f = fixture().await;
        let principal = f.store.find("alice").await.unwrap().unwrap();
        let first = f.issuer.issue(&principal).await.unwrap();

        let second = f.rotator.rotate(&first.refresh_token).await.unwrap();

        // The old token is unexpired and correctly signed, yet replay fails
        assert!(matches!(
            f.rotator.rotate(&first.refresh_token).await,
            Err(AuthError::RefreshMismatch)
        ));

        // The successor works exactly once
        let third = f.rotator.rotate(&second.refresh_token).await.unwrap();
        assert!(matches!(
            f.rotator.rotate(&second.refresh_token).await,
            Err(AuthError::RefreshMismatch)
        ));
        assert!(f.rotator.rotate(&third.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_rotation_picks_up_role_change() {
        let f = fixture().await;
        let principal = f.store.find("alice").await.unwrap().unwrap();
        let pair = f.issuer.issue(&principal).await.unwrap();

        f.store.update_role("alice", Role::Admin).await.unwrap();

        let rotated = f.rotator.rotate(&pair.refresh_token).await.unwrap();
        let access = f.codec.decode(&rotated.access_token).unwrap();
        assert_eq!(access.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_rotation_after_principal_deletion_fails() {
        let f = fixture().await;
        let principal = f.store.find("alice").await.unwrap().unwrap();
        let pair = f.issuer.issue(&principal).await.unwrap();

        f.store.delete("alice").await.unwrap();

        assert!(matches!(
            f.rotator.rotate(&pair.refresh_token).await,
            Err(AuthError::RefreshMismatch)
        ));
    }
}
