use crate::{
    auth::Authenticated,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdate},
    services::tasks,
    state::AppState,
};
use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` keeps completed tasks, any other value keeps open ones.
/// - `limit`, `skip` (optional): pagination. Values that are not positive integers are ignored.
/// - `sortBy` (optional): `<field>:<asc|desc>` where field is `createdAt`, `updatedAt`,
///   `description` or `completed`. Without it tasks come back in creation order.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `401 Unauthorized`: missing or revoked token.
pub async fn get_tasks(
    state: web::Data<AppState>,
    auth: Authenticated,
    query: web::Query<TaskQuery>,
) -> Result<HttpResponse, AppError> {
    let tasks = tasks::list(&state, auth.user.id, query.into_inner().into_filter()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Request Body:
/// - `description`: required, non-blank.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: missing or blank description.
pub async fn create_task(
    state: web::Data<AppState>,
    auth: Authenticated,
    body: web::Json<TaskInput>,
) -> Result<HttpResponse, AppError> {
    let task = tasks::create(&state, auth.user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task. Tasks of other users are reported as `404 Not Found`.
pub async fn get_task(
    state: web::Data<AppState>,
    auth: Authenticated,
    task_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let task = tasks::get(&state, auth.user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task the authenticated user owns.
///
/// Only `description` and `completed` may be sent.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: a field outside the whitelist, or an invalid value.
/// - `404 Not Found`: no such task for this user.
pub async fn update_task(
    state: web::Data<AppState>,
    auth: Authenticated,
    task_id: web::Path<Uuid>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let update = TaskUpdate::from_body(body.into_inner())?;
    let task = tasks::update(&state, auth.user.id, task_id.into_inner(), update).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the authenticated user owns and returns it.
pub async fn delete_task(
    state: web::Data<AppState>,
    auth: Authenticated,
    task_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let task = tasks::delete(&state, auth.user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}
