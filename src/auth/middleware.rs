use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::Authenticated;
use crate::error::AppError;
use crate::state::AppState;

/// Guards a resource behind `Authorization: Bearer <token>`.
///
/// The token must carry a valid signature, must not be expired, and must still be
/// in its user's token list. On success the `Authenticated` context is inserted
/// into the request extensions; on failure the wrapped handler never runs and the
/// client gets a 401.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
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
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let context = authenticate(&req).await?;
            req.extensions_mut().insert(context);
            service.call(req).await
        })
    }
}

fn please_authenticate() -> AppError {
    AppError::Unauthorized("Please authenticate.".into())
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn authenticate(req: &ServiceRequest) -> Result<Authenticated, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("AppState is not registered".into()))?;

    let token = bearer_token(req).ok_or_else(|| {
        log::debug!("Rejected {}: missing bearer token", req.path());
        please_authenticate()
    })?;

    let claims = state.tokens.verify_token(token).map_err(|e| {
        log::warn!("Rejected {}: {}", req.path(), e);
        please_authenticate()
    })?;

    let user = state
        .store
        .find_user_with_token(claims.user_id, token)
        .await?
        .ok_or_else(|| {
            log::warn!(
                "Rejected {}: token for user {} is revoked or the user is gone",
                req.path(),
                claims.user_id
            );
            please_authenticate()
        })?;

    Ok(Authenticated {
        user,
        token: token.to_string(),
    })
}
