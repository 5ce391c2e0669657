/// HTTP middleware utilities for the blog service
///
/// Token authentication resolves `Authorization: Token <key>` (or the
/// `Bearer` alias) against the auth_tokens table and stores the user id
/// in request extensions. Requests without credentials pass through
/// anonymously so public reads and authenticated writes can share one
/// route scope; handlers that mutate state opt in via the `UserId`
/// extractor.
pub mod permissions;

use crate::error::AppError;
use crate::services::UserService;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

/// Pull the token key out of an Authorization header value.
///
/// Accepts the original `Token <key>` scheme and `Bearer <key>` as an
/// alias. Returns None for any other scheme.
pub fn parse_token_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Token ")
        .or_else(|| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Actix middleware that resolves opaque auth tokens to user ids.
pub struct TokenAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TokenAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TokenAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct TokenAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TokenAuthMiddlewareService<S>
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
        let service = self.service.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .map(str::to_owned);

            if let Some(header) = header {
                let key = parse_token_header(&header).ok_or_else(|| {
                    Error::from(AppError::Unauthorized(
                        "Invalid Authorization scheme".to_string(),
                    ))
                })?;

                let pool = req
                    .app_data::<actix_web::web::Data<PgPool>>()
                    .ok_or_else(|| {
                        Error::from(AppError::Internal(
                            "Database pool not configured".to_string(),
                        ))
                    })?;

                let users = UserService::new(pool.get_ref().clone());
                let user_id = users
                    .find_user_id_by_token(key)
                    .await
                    .map_err(Error::from)?
                    .ok_or_else(|| {
                        Error::from(AppError::Unauthorized("Invalid token".to_string()))
                    })?;

                req.extensions_mut().insert(UserId(user_id));
            }

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(req.extensions().get::<UserId>().cloned().ok_or_else(|| {
            Error::from(AppError::Unauthorized(
                "Authentication credentials were not provided".to_string(),
            ))
        }))
    }
}
