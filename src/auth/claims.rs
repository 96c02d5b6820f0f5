/// Token claims
///
/// The signed payload of a token: subject, role snapshot, and timestamps.
/// Access tokens carry the role the principal had at issuance time and are
/// trusted for authorization without a store lookup; refresh tokens omit
/// the role on purpose (they only re-authenticate, so a leaked one decoded
/// offline reveals as little as possible).

use serde::{Deserialize, Serialize};

use crate::principal::Role;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Role snapshot at issuance, absent on refresh tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    /// Claims for an access token: short-lived, carries the role
    pub fn access(username: &str, role: Role, ttl_seconds: i64, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: username.to_string(),
            role: Some(role),
            iat: now,
            exp: now + ttl_seconds,
            iss: issuer.to_string(),
        }
    }

    /// Claims for a refresh token: long-lived, identity only
    pub fn refresh(username: &str, ttl_seconds: i64, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: username.to_string(),
            role: None,
            iat: now,
            exp: now + ttl_seconds,
            iss: issuer.to_string(),
        }
    }

    /// `exp == now` still counts as valid; the tie goes to the holder and
    /// the outcome is deterministic under a fixed clock.
    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_carry_role() {
        let claims = TokenClaims::access("alice", Role::Moderator, 60, "hive");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Some(Role::Moderator));
        assert_eq!(claims.exp, claims.iat + 60);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_claims_omit_role() {
        let claims = TokenClaims::refresh("alice", 604800, "hive");
        assert!(claims.role.is_none());

        // The omitted role must not appear in the signed payload at all
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("role"));
    }

    #[test]
    fn test_expiry_in_past() {
        let claims = TokenClaims::access("alice", Role::Regular, -10, "hive");
        assert!(claims.is_expired());
    }
}
