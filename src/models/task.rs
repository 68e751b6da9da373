use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::check_whitelist;
use crate::error::AppError;

/// Fields a task owner may change through `PATCH /tasks/{id}`.
pub const TASK_UPDATABLE_FIELDS: [&str; 2] = ["description", "completed"];

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    /// The user the task belongs to. Every task query is filtered on it.
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of `POST /tasks`.
///
/// Any `owner` sent by the client is ignored; the task always belongs to the
/// authenticated user.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 1000, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates a new `Task` owned by `owner`, stamped with the current time.
    pub fn new(input: TaskInput, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description: input.description.trim().to_string(),
            completed: input.completed,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TaskInput {
    pub fn normalized(self) -> Self {
        Self {
            description: self.description.trim().to_string(),
            completed: self.completed,
        }
    }
}

/// Payload of `PATCH /tasks/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 1000, message = "Description is required"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn from_body(body: Map<String, Value>) -> Result<Self, AppError> {
        check_whitelist(&body, &TASK_UPDATABLE_FIELDS)?;
        let update: TaskUpdate = serde_json::from_value(Value::Object(body))
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let update = Self {
            description: update.description.map(|d| d.trim().to_string()),
            completed: update.completed,
        };
        update.validate()?;
        Ok(update)
    }

    /// Copies the present fields onto `task` and bumps `updated_at`.
    pub fn apply(self, task: &mut Task) {
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
    }
}

/// Raw query string of `GET /tasks`.
///
/// Values are kept as strings so that garbage in `limit` or `skip` is ignored
/// instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

/// Columns a task list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            "description" => Some(SortField::Description),
            "completed" => Some(SortField::Completed),
            _ => None,
        }
    }

    /// SQL column backing the field.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Description => "description",
            SortField::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub descending: bool,
}

impl TaskSort {
    /// Parses `field:asc` or `field:desc`.
    fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = raw.split_once(':')?;
        let descending = match direction {
            "asc" => false,
            "desc" => true,
            _ => return None,
        };
        Some(Self {
            field: SortField::parse(field)?,
            descending,
        })
    }
}

/// Typed form of `TaskQuery`, consumed by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    pub sort: Option<TaskSort>,
}

fn positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
}

impl TaskQuery {
    pub fn into_filter(self) -> TaskFilter {
        let completed = match self.completed.as_deref() {
            None | Some("") => None,
            Some(value) => Some(value == "true"),
        };
        let sort = self.sort_by.as_deref().and_then(|raw| {
            let sort = TaskSort::parse(raw);
            if sort.is_none() {
                log::debug!("Ignoring unsupported sortBy value: {}", raw);
            }
            sort
        });
        TaskFilter {
            completed,
            limit: positive(self.limit.as_deref()),
            skip: positive(self.skip.as_deref()),
            sort,
        }
    }
}
