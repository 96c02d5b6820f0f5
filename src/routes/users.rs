/// User management routes
///
/// Role-gated operations over principals. Policies run against the claims
/// injected by the access-token middleware; denial maps to 403.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{authorize, AuthService, Policy, TokenClaims};
use crate::error::AuthError;
use crate::principal::Role;

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// DELETE /api/users/{username}
///
/// A principal may delete itself; admins may delete anyone. Deleting the
/// record also drops its refresh hash, so any outstanding refresh token is
/// implicitly invalidated.
pub async fn delete_user(
    path: web::Path<String>,
    claims: web::ReqData<TokenClaims>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let username = path.into_inner();

    let policy = Policy::OwnerOrRoleIn {
        owner: &username,
        roles: &[Role::Admin],
    };
    if !authorize(&claims.into_inner(), &policy) {
        return Err(AuthError::Unauthorized);
    }

    service.delete(&username).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted successfully",
    })))
}

/// PUT /api/users/{username}/role
///
/// Admin only. The change takes effect on the target's next issuance or
/// rotation; already-issued access tokens keep their role snapshot.
pub async fn update_role(
    path: web::Path<String>,
    form: web::Json<UpdateRoleRequest>,
    claims: web::ReqData<TokenClaims>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    if !authorize(&claims.into_inner(), &Policy::RoleIn(&[Role::Admin])) {
        return Err(AuthError::Unauthorized);
    }

    let username = path.into_inner();
    service.update_role(&username, form.role).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User role updated successfully",
    })))
}
