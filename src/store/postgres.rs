use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

const USER_COLUMNS: &str =
    "id, name, email, password, age, tokens, avatar, created_at, updated_at";
const TASK_COLUMNS: &str = "id, description, completed, owner, created_at, updated_at";

/// Postgres backend. Users keep their session tokens in a `TEXT[]` column so
/// that login and logout are single `array_append` / `array_remove` statements.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the SQL files under `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password, age, tokens, avatar, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.age)
            .bind(&user.tokens)
            .bind(&user.avatar)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_with_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND $2 = ANY(tokens)",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_profile(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password = $4, age = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.age)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET tokens = array_append(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET tokens = array_remove(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_tokens(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET tokens = '{}' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET avatar = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, description, completed, owner, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.owner)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1 AND owner = $2", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM tasks WHERE owner = ", TASK_COLUMNS));
        query.push_bind(owner);

        if let Some(completed) = filter.completed {
            query.push(" AND completed = ").push_bind(completed);
        }

        // Column names come from `SortField::column`, never from the request.
        query.push(" ORDER BY ");
        if let Some(sort) = filter.sort {
            query.push(sort.field.column());
            query.push(if sort.descending { " DESC, " } else { " ASC, " });
        }
        query.push("created_at ASC, id ASC");

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }
        if let Some(skip) = filter.skip {
            query.push(" OFFSET ").push_bind(skip);
        }

        let tasks = query.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET description = $3, completed = $4, updated_at = $5 \
             WHERE id = $1 AND owner = $2 RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.owner)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "DELETE FROM tasks WHERE id = $1 AND owner = $2 RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_tasks_by_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
