use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{SortField, Task, TaskFilter, User};

/// In-process store. Each operation holds the lock for its whole duration, so
/// token list changes are as atomic as the single-statement updates in Postgres.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    // Insertion order doubles as the default listing order.
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|user| user.email == email && Some(user.id) != except)
}

fn compare(a: &Task, b: &Task, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Description => a.description.cmp(&b.description),
        SortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_user_with_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .filter(|user| user.tokens.iter().any(|t| t == token))
            .cloned())
    }

    async fn update_profile(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, Some(user.id)) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password = user.password.clone();
        stored.age = user.age;
        stored.updated_at = user.updated_at;
        Ok(stored.clone())
    }

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.tokens.push(token.to_string());
        Ok(())
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.tokens.retain(|t| t != token);
        }
        Ok(())
    }

    async fn clear_tokens(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.tokens.clear();
        }
        Ok(())
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.avatar = avatar;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.write().await.remove(&id))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        self.tasks.write().await.push(task.clone());
        Ok(task.clone())
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .find(|task| task.id == id && task.owner == owner)
            .cloned())
    }

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|task| task.owner == owner)
            .filter(|task| filter.completed.map_or(true, |c| task.completed == c))
            .cloned()
            .collect();

        if let Some(sort) = filter.sort {
            tasks.sort_by(|a, b| {
                let ordering = compare(a, b, sort.field);
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let skip = filter.skip.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |limit| limit as usize);
        Ok(tasks.into_iter().skip(skip).take(limit).collect())
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        let stored = tasks
            .iter_mut()
            .find(|stored| stored.id == task.id && stored.owner == task.owner);
        Ok(stored.map(|stored| {
            stored.description = task.description.clone();
            stored.completed = task.completed;
            stored.updated_at = task.updated_at;
            stored.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        let position = tasks
            .iter()
            .position(|task| task.id == id && task.owner == owner);
        Ok(position.map(|index| tasks.remove(index)))
    }

    async fn delete_tasks_by_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| task.owner != owner);
        Ok((before - tasks.len()) as u64)
    }
}
