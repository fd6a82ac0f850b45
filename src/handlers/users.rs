use crate::core::error::DirectoryError;
use crate::core::state::AppState;
use crate::models::response::SuccessResponse;
use crate::models::user::{NewUser, User, UserInfo, UserProfile};
use crate::utils::auth::Credentials;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

fn log_rejection(operation: &'static str, caller: &str, target: Option<&str>, error: &DirectoryError) {
    warn!(
        operation,
        caller = %caller,
        target_login = ?target,
        status = error.status().as_u16(),
        reason = %error,
        "User directory request rejected"
    );
}

/// Create a user
///
/// POST /api/users
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new_user): Json<NewUser>,
) -> Result<Json<User>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);
    let login = new_user.login.clone();

    let user = state
        .directory
        .create_user(new_user, &credentials, Utc::now())
        .inspect_err(|e| log_rejection("create_user", credentials.caller(), Some(login.as_str()), e))?;

    info!(login = %user.login, created_by = %user.created_by, admin = user.admin, "User created");

    Ok(Json(user))
}

/// PUT /api/users/update-info/{loginToUpdate}
pub async fn update_info_handler(
    State(state): State<Arc<AppState>>,
    Path(login_to_update): Path<String>,
    headers: HeaderMap,
    Json(info): Json<UserInfo>,
) -> Result<Json<User>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let user = state
        .directory
        .update_info(&login_to_update, info, &credentials, Utc::now())
        .inspect_err(|e| log_rejection("update_info", credentials.caller(), Some(login_to_update.as_str()), e))?;

    info!(login = %user.login, modified_by = %credentials.caller(), "User info updated");

    Ok(Json(user))
}

/// PUT /api/users/update-password/{loginToUpdate}
///
/// Body is the new password as a JSON string.
pub async fn update_password_handler(
    State(state): State<Arc<AppState>>,
    Path(login_to_update): Path<String>,
    headers: HeaderMap,
    Json(new_password): Json<String>,
) -> Result<Json<User>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let user = state
        .directory
        .update_password(&login_to_update, new_password, &credentials, Utc::now())
        .inspect_err(|e| {
            log_rejection("update_password", credentials.caller(), Some(login_to_update.as_str()), e)
        })?;

    info!(login = %user.login, modified_by = %credentials.caller(), "User password updated");

    Ok(Json(user))
}

/// PUT /api/users/update-login/{loginToUpdate}
///
/// Body is the new login as a JSON string.
pub async fn update_login_handler(
    State(state): State<Arc<AppState>>,
    Path(login_to_update): Path<String>,
    headers: HeaderMap,
    Json(new_login): Json<String>,
) -> Result<Json<User>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let user = state
        .directory
        .update_login(&login_to_update, new_login, &credentials, Utc::now())
        .inspect_err(|e| log_rejection("update_login", credentials.caller(), Some(login_to_update.as_str()), e))?;

    info!(
        old_login = %login_to_update,
        new_login = %user.login,
        modified_by = %credentials.caller(),
        "User login updated"
    );

    Ok(Json(user))
}

/// GET /api/users/active-users
pub async fn active_users_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let users = state
        .directory
        .list_active_users(&credentials)
        .inspect_err(|e| log_rejection("list_active_users", credentials.caller(), None, e))?;

    Ok(Json(users))
}

/// GET /api/users/{login}
pub async fn get_by_login_handler(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let profile = state
        .directory
        .get_by_login(&login, &credentials)
        .inspect_err(|e| log_rejection("get_by_login", credentials.caller(), Some(login.as_str()), e))?;

    Ok(Json(profile))
}

/// GET /api/users/self
pub async fn self_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let profile = state
        .directory
        .get_self(&credentials)
        .inspect_err(|e| log_rejection("get_self", credentials.caller(), None, e))?;

    Ok(Json(profile))
}

/// GET /api/users/older-than/{age}
pub async fn older_than_handler(
    State(state): State<Arc<AppState>>,
    Path(age): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let users = state
        .directory
        .list_older_than(age, &credentials, Utc::now())
        .inspect_err(|e| log_rejection("list_older_than", credentials.caller(), None, e))?;

    Ok(Json(users))
}

/// DELETE /api/users/{login}
///
/// Body is a JSON boolean: `true` revokes the user, `false` removes it.
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
    headers: HeaderMap,
    Json(soft_delete): Json<bool>,
) -> Result<Json<SuccessResponse>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    state
        .directory
        .delete_user(&login, soft_delete, &credentials, Utc::now())
        .inspect_err(|e| log_rejection("delete_user", credentials.caller(), Some(login.as_str()), e))?;

    info!(login = %login, soft_delete, deleted_by = %credentials.caller(), "User deleted");

    let message = if soft_delete {
        "User revoked successfully"
    } else {
        "User deleted successfully"
    };

    Ok(Json(SuccessResponse {
        success: true,
        message: message.to_string(),
    }))
}

/// PUT /api/users/restore/{login}
pub async fn restore_user_handler(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>, DirectoryError> {
    let credentials = Credentials::from_headers(&headers);

    let user = state
        .directory
        .restore_user(&login, &credentials)
        .inspect_err(|e| log_rejection("restore_user", credentials.caller(), Some(login.as_str()), e))?;

    info!(login = %login, restored_by = %credentials.caller(), "User restored");

    Ok(Json(user))
}
