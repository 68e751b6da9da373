use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    auth::{AuthResponse, Authenticated, LoginRequest},
    error::AppError,
    models::{SignupRequest, UserUpdate},
    services::{avatar, users},
    state::AppState,
};

/// Register a new user
///
/// `POST /users`. Creates the account and returns it with its first session token.
///
/// ## Responses:
/// - `201 Created`: `{user, token}`.
/// - `400 Bad Request`: missing or invalid fields, or the email is already registered.
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = users::signup(&state, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// Login user
///
/// `POST /users/login`. Appends a new token to the user's token list; earlier
/// sessions stay valid.
///
/// ## Responses:
/// - `200 OK`: `{user, token}`.
/// - `400 Bad Request`: unknown email or wrong password.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = users::login(&state, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// `POST /users/logout`: revokes the presenting token only.
pub async fn logout(
    state: web::Data<AppState>,
    auth: Authenticated,
) -> Result<HttpResponse, AppError> {
    users::logout(&state, &auth).await?;
    Ok(HttpResponse::Ok().finish())
}

/// `POST /users/logoutAll`: revokes every token of the user.
pub async fn logout_all(
    state: web::Data<AppState>,
    auth: Authenticated,
) -> Result<HttpResponse, AppError> {
    users::logout_all(&state, &auth).await?;
    Ok(HttpResponse::Ok().finish())
}

/// `GET /users/me`
pub async fn me(auth: Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(auth.user)
}

/// Update the authenticated user
///
/// `PATCH /users/me`. Only `name`, `email`, `password` and `age` may be sent;
/// any other key fails the whole request and nothing is written.
///
/// ## Responses:
/// - `200 OK`: the updated user.
/// - `400 Bad Request`: a field outside the whitelist, or an invalid value.
pub async fn update_me(
    state: web::Data<AppState>,
    auth: Authenticated,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let update = UserUpdate::from_body(body.into_inner())?;
    let user = users::update_profile(&state, auth.user, update).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// `DELETE /users/me`: removes the account and all of its tasks, returning the deleted user.
pub async fn delete_me(
    state: web::Data<AppState>,
    auth: Authenticated,
) -> Result<HttpResponse, AppError> {
    let user = users::delete_account(&state, &auth.user).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Upload an avatar
///
/// `POST /users/me/avatar`, `multipart/form-data` with the image in the `avatar`
/// field. The file must be a jpg, jpeg or png of at most 1 MB; it is stored as a
/// 250x250 PNG.
///
/// ## Responses:
/// - `200 OK`: empty body.
/// - `400 Bad Request`: `{"error": ...}` for a missing, oversized or non-image file.
pub async fn upload_avatar(
    state: web::Data<AppState>,
    auth: Authenticated,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let upload = avatar::read_upload(payload).await?;
    avatar::save(&state, auth.user.id, upload).await?;
    Ok(HttpResponse::Ok().finish())
}

/// `DELETE /users/me/avatar`
pub async fn delete_avatar(
    state: web::Data<AppState>,
    auth: Authenticated,
) -> Result<HttpResponse, AppError> {
    avatar::remove(&state, auth.user.id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// `GET /users/{id}/avatar`: public. Serves the stored PNG or 404.
pub async fn get_avatar(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let png = avatar::fetch(&state, user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}
