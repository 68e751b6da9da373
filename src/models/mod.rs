pub mod task;
pub mod user;

use serde_json::{Map, Value};

use crate::error::AppError;

pub use task::{SortField, Task, TaskFilter, TaskInput, TaskQuery, TaskSort, TaskUpdate};
pub use user::{NewUser, SignupRequest, User, UserUpdate};

/// Fails with `Invalid update` if `body` has any key outside `allowed`.
pub(crate) fn check_whitelist(body: &Map<String, Value>, allowed: &[&str]) -> Result<(), AppError> {
    if body.keys().all(|key| allowed.contains(&key.as_str())) {
        Ok(())
    } else {
        Err(AppError::ValidationError("Invalid update".into()))
    }
}
