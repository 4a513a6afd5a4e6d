/// HTTP middleware: the access guard for authenticated routes
///
/// Extracts the bearer credential from the `Authorization` header, verifies
/// its signature and expiry, and checks it against the token currently
/// stored for the user so logout revokes a still-unexpired token. Handlers
/// receive the resolved identity through the `AuthedUser` extractor.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::security::TokenService;

/// Resolved user identity stored in request extensions after auth
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub Uuid);

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or(AppError::Unauthorized(
                    "Missing Authorization header".to_string(),
                ))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(AppError::Unauthorized(
                    "Invalid Authorization scheme".to_string(),
                ))?;

            let tokens = req
                .app_data::<web::Data<TokenService>>()
                .ok_or(AppError::Internal("token service not configured".to_string()))?;

            let user_id = tokens.verify_auth_token(token)?;

            // Revocation check: the presented token must still be the one
            // stored for the user (logout clears it, login replaces it).
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .ok_or(AppError::Internal("database pool not configured".to_string()))?;

            let stored = db::users::session_token(pool, user_id).await?;
            if stored.as_deref() != Some(token) {
                return Err(AppError::Unauthorized(
                    "Token is no longer valid. Please log in again.".to_string(),
                )
                .into());
            }

            req.extensions_mut().insert(AuthedUser(user_id));

            service.call(req).await
        })
    }
}

impl FromRequest for AuthedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthedUser>()
                .copied()
                .ok_or_else(|| {
                    AppError::Unauthorized("Authentication required".to_string()).into()
                }),
        )
    }
}
