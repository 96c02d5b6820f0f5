/// Authentication Routes
///
/// Registration, login, token refresh, logout, and a claims echo for
/// authenticated callers. Tokens are returned in HTTP-only cookies and,
/// outside production, mirrored into the JSON body.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, TokenClaims, TokenPair};
use crate::configuration::{ApplicationSettings, JwtSettings};
use crate::cookies::{
    access_cookie, refresh_cookie, removal_cookie, ACCESS_COOKIE, REFRESH_COOKIE,
};
use crate::error::AuthError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Token response body; the token fields are only populated outside
/// production (the cookies are the canonical channel).
#[derive(Serialize)]
pub struct TokenResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
}

fn token_response(
    message: &str,
    pair: TokenPair,
    app: &ApplicationSettings,
    jwt: &JwtSettings,
) -> HttpResponse {
    let secure = app.is_production();
    let mirror = !app.is_production();

    let mut response = HttpResponse::Ok();
    response
        .cookie(access_cookie(&pair.access_token, jwt.access_token_expiry, secure))
        .cookie(refresh_cookie(&pair.refresh_token, jwt.refresh_token_expiry, secure));

    response.json(TokenResponse {
        message: message.to_string(),
        access_token: mirror.then(|| pair.access_token),
        refresh_token: mirror.then(|| pair.refresh_token),
        token_type: "Bearer".to_string(),
        expires_in: jwt.access_token_expiry,
    })
}

/// POST /api/register
///
/// # Errors
/// - 400: validation errors (username/email/password)
/// - 409: username or email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let principal = service
        .register(&form.username, &form.email, &form.password)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User registered successfully",
        "username": principal.username,
    })))
}

/// POST /api/login
///
/// Authenticates by username or email. On success sets both token cookies
/// and stores the new refresh hash, superseding any previous refresh token.
///
/// # Errors
/// - 401: missing fields, unknown principal, or wrong password
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
    app: web::Data<ApplicationSettings>,
    jwt: web::Data<JwtSettings>,
) -> Result<HttpResponse, AuthError> {
    let pair = service.login(&form.identifier, &form.password).await?;

    Ok(token_response("Login successful", pair, app.get_ref(), jwt.get_ref()))
}

/// POST /api/refresh
///
/// Rotation on use: the presented refresh token is validated against the
/// stored hash and replaced by a fresh pair. The token is taken from the
/// `refresh_token` cookie, falling back to the JSON body.
///
/// # Errors
/// - 401: missing, malformed, forged, expired, or superseded token
pub async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    service: web::Data<AuthService>,
    app: web::Data<ApplicationSettings>,
    jwt: web::Data<JwtSettings>,
) -> Result<HttpResponse, AuthError> {
    let token = req
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token))
        .ok_or(AuthError::MissingCredentials)?;

    let pair = service.refresh(&token).await?;

    Ok(token_response("Token refreshed successfully", pair, app.get_ref(), jwt.get_ref()))
}

/// POST /api/logout
///
/// Clears both token cookies. The stored refresh hash is left in place to
/// be superseded by the next login or to age out.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie(ACCESS_COOKIE))
        .cookie(removal_cookie(REFRESH_COOKIE))
        .json(serde_json::json!({ "message": "Logged out successfully" }))
}

/// GET /api/protected
///
/// Echoes the claims injected by the access-token middleware.
pub async fn protected(claims: web::ReqData<TokenClaims>) -> HttpResponse {
    let claims = claims.into_inner();
    HttpResponse::Ok().json(serde_json::json!({
        "username": claims.sub,
        "role": claims.role,
        "issued_at": claims.iat,
        "expires_at": claims.exp,
    }))
}
