/// Access token middleware
///
/// Decodes the access token from the Authorization header (or the
/// `access_token` cookie) and injects the claims into request extensions
/// for route handlers. Decisions downstream run on these claims alone;
/// no store lookup happens per request.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{DecodeError, TokenCodec};
use crate::cookies::ACCESS_COOKIE;

pub struct AccessTokenMiddleware {
    codec: TokenCodec,
}

impl AccessTokenMiddleware {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessTokenMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessTokenMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AccessTokenMiddlewareService {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

pub struct AccessTokenMiddlewareService<S> {
    service: Rc<S>,
    codec: TokenCodec,
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    bearer.or_else(|| req.cookie(ACCESS_COOKIE).map(|c| c.value().to_string()))
}

fn unauthorized(reason: &str, code: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": reason,
        "code": code,
    }))
}

impl<S, B> Service<ServiceRequest> for AccessTokenMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match extract_token(&req) {
            Some(token) => token,
            None => {
                tracing::warn!("Missing access token");
                let response = unauthorized("Missing authentication token", "MISSING_TOKEN");
                return Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Unauthorized", response)
                        .into())
                });
            }
        };

        match self.codec.decode(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims.clone());

                tracing::debug!(username = %claims.sub, "Access token validated");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(kind = ?e, "Access token rejected");
                // Expired gets its own code so clients know to refresh
                let response = match e {
                    DecodeError::Expired => unauthorized("Token has expired", "TOKEN_EXPIRED"),
                    DecodeError::BadSignature | DecodeError::Malformed => {
                        unauthorized("Invalid token", "TOKEN_INVALID")
                    }
                };
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response("Invalid token", response)
                        .into())
                })
            }
        }
    }
}
