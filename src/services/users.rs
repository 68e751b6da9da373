//! Account operations. Password hashing, email normalization and the task
//! cascade on delete happen here, explicitly, before the store is called.

use actix_web::web;
use chrono::Utc;
use validator::Validate;

use crate::auth::{hash_password, verify_password, Authenticated, LoginRequest};
use crate::error::AppError;
use crate::models::{NewUser, SignupRequest, User, UserUpdate};
use crate::state::AppState;

/// Runs bcrypt on the blocking pool.
async fn hash_off_thread(password: String, cost: u32) -> Result<String, AppError> {
    web::block(move || hash_password(&password, cost)).await?
}

/// Issues a new token and appends it to the user's token list.
async fn issue_token(state: &AppState, user: &User) -> Result<String, AppError> {
    let token = state.tokens.generate_token(user.id)?;
    state.store.push_token(user.id, &token).await?;
    Ok(token)
}

/// Creates an account and logs it in.
pub async fn signup(state: &AppState, request: SignupRequest) -> Result<(User, String), AppError> {
    let request = request.normalized();
    request.validate()?;

    if state.store.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_off_thread(request.password, state.bcrypt_cost).await?;
    let user = state
        .store
        .insert_user(&User::new(NewUser {
            name: request.name,
            email: request.email,
            password_hash,
            age: request.age.unwrap_or(0),
        }))
        .await?;
    let token = issue_token(state, &user).await?;

    log::info!("Created user {}", user.id);
    Ok((user, token))
}

/// Checks credentials and appends a new session token.
///
/// Unknown email and wrong password produce the same error, and neither touches
/// the token list.
pub async fn login(state: &AppState, request: LoginRequest) -> Result<(User, String), AppError> {
    let rejected = || AppError::BadRequest("Unable to login".into());
    let request = request.normalized();
    request.validate().map_err(|_| rejected())?;

    let user = state
        .store
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(rejected)?;

    let stored_hash = user.password.clone();
    let password = request.password;
    let matches = web::block(move || verify_password(&password, &stored_hash)).await??;
    if !matches {
        log::info!("Failed login for user {}", user.id);
        return Err(rejected());
    }

    let token = issue_token(state, &user).await?;
    log::info!("User {} logged in", user.id);
    Ok((user, token))
}

/// Revokes only the token the request was made with.
pub async fn logout(state: &AppState, auth: &Authenticated) -> Result<(), AppError> {
    state.store.remove_token(auth.user.id, &auth.token).await
}

/// Revokes every session of the user.
pub async fn logout_all(state: &AppState, auth: &Authenticated) -> Result<(), AppError> {
    state.store.clear_tokens(auth.user.id).await
}

/// Applies a whitelisted profile update. A new password is re-hashed first.
pub async fn update_profile(
    state: &AppState,
    mut user: User,
    update: UserUpdate,
) -> Result<User, AppError> {
    if let Some(email) = update.email {
        if email != user.email && state.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        user.email = email;
    }
    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(age) = update.age {
        user.age = age;
    }
    if let Some(password) = update.password {
        user.password = hash_off_thread(password, state.bcrypt_cost).await?;
    }
    user.updated_at = Utc::now();

    state.store.update_profile(&user).await
}

/// Deletes the user's tasks, then the user.
pub async fn delete_account(state: &AppState, user: &User) -> Result<User, AppError> {
    let removed_tasks = state.store.delete_tasks_by_owner(user.id).await?;
    let deleted = state
        .store
        .delete_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    log::info!("Deleted user {} and {} task(s)", deleted.id, removed_tasks);
    Ok(deleted)
}
