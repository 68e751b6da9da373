use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The requester of an authenticated route: the loaded user and the exact token
/// they presented.
///
/// `AuthMiddleware` builds this value and stores it in the request extensions;
/// handlers take it as an argument. If it is missing (the route was registered
/// without the middleware) extraction fails with `AppError::Unauthorized`, so a
/// wiring mistake can never expose a route anonymously.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

impl FromRequest for Authenticated {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Authenticated>().cloned() {
            Some(context) => ready(Ok(context)),
            None => {
                log::error!(
                    "No authenticated context on {}; is AuthMiddleware applied?",
                    req.path()
                );
                let err = AppError::Unauthorized("Please authenticate.".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
