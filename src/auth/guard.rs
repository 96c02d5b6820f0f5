/// Authorization guard
///
/// Pure decision logic over already-decoded claims; no store access.
/// Decisions run against the role snapshot embedded in the access token,
/// a deliberate trade-off of immediacy for statelessness: a role change
/// only takes effect on the next issuance or rotation.

use crate::auth::claims::TokenClaims;
use crate::principal::Role;

/// Permission predicate for a protected operation
#[derive(Debug, Clone)]
pub enum Policy<'a> {
    /// Any successfully decoded, non-expired access token
    AnyAuthenticated,
    /// Claims role must be a member of the set
    RoleIn(&'a [Role]),
    /// Subject matches the resource owner, or the role is in the set
    OwnerOrRoleIn {
        owner: &'a str,
        roles: &'a [Role],
    },
}

/// Denial is a plain `false`; the caller maps it to a user-facing rejection.
/// Claims without a role (a refresh token presented where an access token
/// belongs) satisfy no role predicate.
pub fn authorize(claims: &TokenClaims, policy: &Policy<'_>) -> bool {
    match policy {
        Policy::AnyAuthenticated => true,
        Policy::RoleIn(roles) => claims.role.map_or(false, |r| roles.contains(&r)),
        Policy::OwnerOrRoleIn { owner, roles } => {
            claims.sub == *owner || claims.role.map_or(false, |r| roles.contains(&r))
        }
    }
}
