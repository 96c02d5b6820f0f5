/// Token codec
///
/// Encodes and decodes signed, time-bounded claim sets with HS256 over a
/// shared secret. Decoding is pure verification: it never touches the
/// credential store, and it surfaces expiry, forgery and garbage as three
/// distinct kinds because they lead to different user-facing outcomes.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::TokenClaims;
use crate::configuration::JwtSettings;
use crate::error::AuthError;

/// Decode failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Tampered payload or foreign signing key
    BadSignature,
    /// Unparsable structure
    Malformed,
    /// Valid signature, past `exp`
    Expired,
}

impl From<DecodeError> for AuthError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::BadSignature => AuthError::TokenBadSignature,
            DecodeError::Malformed => AuthError::TokenMalformed,
            DecodeError::Expired => AuthError::TokenExpired,
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a claim set. The signature covers the whole payload, so any
    /// mutation invalidates it.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature, issuer and expiry, then return the claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, DecodeError> {
        self.decode_with(token, true)
    }

    /// Verify signature and issuer but skip the expiry check. The refresh
    /// path needs this: an expired-but-genuine token must be reported as
    /// expired, which requires extracting its claims first, while a forged
    /// one is rejected here regardless of timestamps.
    pub fn decode_allow_expired(&self, token: &str) -> Result<TokenClaims, DecodeError> {
        self.decode_with(token, false)
    }

    fn decode_with(&self, token: &str, validate_exp: bool) -> Result<TokenClaims, DecodeError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = validate_exp;
        // Zero leeway keeps the expiry decision deterministic under a fixed clock
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => DecodeError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer => DecodeError::BadSignature,
                _ => DecodeError::Malformed,
            })
    }
}
