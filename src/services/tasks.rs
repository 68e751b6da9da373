use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, TaskInput, TaskUpdate};
use crate::state::AppState;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub async fn list(state: &AppState, owner: Uuid, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
    state.store.list_tasks(owner, &filter).await
}

pub async fn get(state: &AppState, owner: Uuid, id: Uuid) -> Result<Task, AppError> {
    state
        .store
        .find_task(id, owner)
        .await?
        .ok_or_else(task_not_found)
}

/// Creates a task owned by `owner`, whatever the payload says.
pub async fn create(state: &AppState, owner: Uuid, input: TaskInput) -> Result<Task, AppError> {
    let input = input.normalized();
    input.validate()?;
    state.store.insert_task(&Task::new(input, owner)).await
}

/// Loads the owned task first, so a foreign or missing id is a 404 before anything is written.
pub async fn update(
    state: &AppState,
    owner: Uuid,
    id: Uuid,
    update: TaskUpdate,
) -> Result<Task, AppError> {
    let mut task = get(state, owner, id).await?;
    update.apply(&mut task);
    state
        .store
        .update_task(&task)
        .await?
        .ok_or_else(task_not_found)
}

pub async fn delete(state: &AppState, owner: Uuid, id: Uuid) -> Result<Task, AppError> {
    let task = state
        .store
        .delete_task(id, owner)
        .await?
        .ok_or_else(task_not_found)?;
    log::info!("Deleted task {} of user {}", task.id, owner);
    Ok(task)
}
