pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error, guard, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. Authentication is applied per resource, so the public
/// routes (signup, login, avatar fetch, health) sit next to the protected ones.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err: error::PathError, _req| AppError::NotFound("Not found".into()).into()),
    )
    .service(health::health)
    .service(web::resource("/users").route(web::post().to(users::signup)))
    .service(web::resource("/users/login").route(web::post().to(users::login)))
    .service(
        web::resource("/users/logout")
            .wrap(AuthMiddleware)
            .route(web::post().to(users::logout)),
    )
    .service(
        web::resource("/users/logoutAll")
            .wrap(AuthMiddleware)
            .route(web::post().to(users::logout_all)),
    )
    .service(
        web::resource("/users/me")
            .wrap(AuthMiddleware)
            .route(web::get().to(users::me))
            .route(web::patch().to(users::update_me))
            .route(web::delete().to(users::delete_me)),
    )
    // Public, and registered before `/users/me/avatar` so only GET takes the `{id}` path.
    .service(
        web::resource("/users/{id}/avatar")
            .guard(guard::Get())
            .route(web::get().to(users::get_avatar)),
    )
    .service(
        web::resource("/users/me/avatar")
            .wrap(AuthMiddleware)
            .route(web::post().to(users::upload_avatar))
            .route(web::delete().to(users::delete_avatar)),
    )
    .service(
        web::resource("/tasks")
            .wrap(AuthMiddleware)
            .route(web::get().to(tasks::get_tasks))
            .route(web::post().to(tasks::create_task)),
    )
    .service(
        web::resource("/tasks/{id}")
            .wrap(AuthMiddleware)
            .route(web::get().to(tasks::get_task))
            .route(web::patch().to(tasks::update_task))
            .route(web::delete().to(tasks::delete_task)),
    );
}
