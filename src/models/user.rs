use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::check_whitelist;
use crate::error::AppError;

/// Fields a user may change through `PATCH /users/me`.
pub const USER_UPDATABLE_FIELDS: [&str; 4] = ["name", "email", "password", "age"];

/// A registered account as stored by the persistence layer.
///
/// The password hash, the session token list and the avatar bytes never leave the
/// server: they are skipped when the user is serialized into a response.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    /// Always trimmed and lower-cased.
    pub email: String,
    /// bcrypt hash of the password.
    #[serde(skip_serializing)]
    pub password: String,
    pub age: i32,
    /// Currently valid session tokens, oldest first.
    #[serde(skip_serializing)]
    pub tokens: Vec<String>,
    /// PNG-encoded profile picture.
    #[serde(skip_serializing)]
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user ready to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
}

impl User {
    /// Builds the stored form of a new account, with an empty token list and no avatar.
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password_hash,
            age: new_user.age,
            tokens: Vec::new(),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Rejects passwords that contain the word "password" in any letter case.
pub fn validate_password_content(password: &str) -> Result<(), ValidationError> {
    if password.to_lowercase().contains("password") {
        let mut error = ValidationError::new("password_content");
        error.message = Some("Password cannot contain \"password\"".into());
        return Err(error);
    }
    Ok(())
}

/// Lower-cases and trims an email address the way it is stored.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Payload of `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(
        length(min = 7, message = "Password must be at least 7 characters"),
        custom = "validate_password_content"
    )]
    pub password: String,
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl SignupRequest {
    /// Trims every string field and lower-cases the email before validation.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
            age: self.age,
        }
    }
}

/// Payload of `PATCH /users/me`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(
        length(min = 7, message = "Password must be at least 7 characters"),
        custom = "validate_password_content"
    )]
    pub password: Option<String>,
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl UserUpdate {
    /// Checks the body against the update whitelist, then parses, normalizes and
    /// validates it.
    pub fn from_body(body: Map<String, Value>) -> Result<Self, AppError> {
        check_whitelist(&body, &USER_UPDATABLE_FIELDS)?;
        let update: UserUpdate = serde_json::from_value(Value::Object(body))
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let update = Self {
            name: update.name.map(|name| name.trim().to_string()),
            email: update.email.map(|email| normalize_email(&email)),
            password: update.password.map(|password| password.trim().to_string()),
            age: update.age,
        };
        update.validate()?;
        Ok(update)
    }
}
