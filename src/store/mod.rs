//! Persistence seam.
//!
//! Handlers and services only see the [`UserStore`] and [`TaskStore`] traits.
//! [`postgres::PgStore`] is the production backend; [`memory::MemoryStore`]
//! keeps everything in process and backs the test suite and local runs without
//! a database.
//!
//! Every method is a single store operation. Task methods take the owner id and
//! must never touch a task owned by someone else.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. A duplicate email yields `AppError::BadRequest`.
    async fn insert_user(&self, user: &User) -> Result<User, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Loads the user only if `token` is still in their token list.
    async fn find_user_with_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError>;

    /// Writes back name, email, password hash and age. Tokens and avatar are untouched.
    async fn update_profile(&self, user: &User) -> Result<User, AppError>;

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    async fn remove_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    async fn clear_tokens(&self, id: Uuid) -> Result<(), AppError>;

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<(), AppError>;

    /// Removes the user and returns it, or `None` if it was already gone.
    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError>;

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;

    /// Writes back description, completed and `updated_at`; `None` if no such owned task.
    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError>;

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;

    /// Removes every task of `owner`, returning how many were deleted.
    async fn delete_tasks_by_owner(&self, owner: Uuid) -> Result<u64, AppError>;
}

/// Both halves of the persistence layer behind one handle.
pub trait Store: UserStore + TaskStore {}

impl<T: UserStore + TaskStore> Store for T {}
