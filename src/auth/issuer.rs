/// Token issuance
///
/// Mints a matched access/refresh pair for an authenticated principal and
/// persists the refresh token's hash before the pair is handed back. The
/// overwrite of `refresh_hash` is what keeps exactly one refresh credential
/// valid per principal.

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::auth::claims::TokenClaims;
use crate::auth::token::TokenCodec;
use crate::configuration::JwtSettings;
use crate::error::AuthError;
use crate::principal::Principal;
use crate::store::CredentialStore;

/// Access/refresh token bundle returned to the caller; never persisted.
/// Two independent strings so the boundary can put them in cookies, a JSON
/// body, or both.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Hash a refresh token for storage
///
/// SHA-256 over the encoded token; refresh tokens are high-entropy signed
/// blobs, so an unsalted digest suffices and stays recomputable for the
/// rotation-time comparison. Plaintext tokens are never stored.
pub(crate) fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>, config: &JwtSettings) -> Self {
        Self {
            codec,
            store,
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
        }
    }

    /// Mint a token pair and persist the refresh hash.
    ///
    /// The store write happens before the pair is returned: no caller ever
    /// holds a refresh token whose hash is not durably stored.
    pub async fn issue(&self, principal: &Principal) -> Result<TokenPair, AuthError> {
        let access_claims = TokenClaims::access(
            &principal.username,
            principal.role,
            self.access_ttl,
            self.codec.issuer(),
        );
        let refresh_claims =
            TokenClaims::refresh(&principal.username, self.refresh_ttl, self.codec.issuer());

        let access_token = self.codec.encode(&access_claims)?;
        let refresh_token = self.codec.encode(&refresh_claims)?;

        let stored = self
            .store
            .set_refresh_hash(&principal.username, &hash_refresh_token(&refresh_token))
            .await?;
        if !stored {
            // Principal deleted between authentication and issuance
            return Err(AuthError::PrincipalNotFound);
        }

        tracing::info!(username = %principal.username, "Issued new token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
