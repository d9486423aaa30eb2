/// Profile endpoints for the authenticated caller
///
/// - `GET /user/get_user`
/// - `PATCH /user/change_password`
/// - `PATCH /user/change_phone-number`

use crate::{
    error::{ApiError, ApiResult},
    session::DbSession,
};
use axum::{http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use todo_shared::{auth::jwt::Identity, auth::password, models::User};
use validator::Validate;

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            is_active: user.is_active,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password
    pub password: String,

    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePhoneNumberRequest {
    pub phone_number: String,
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Returns the caller's profile
pub async fn get_user(
    Extension(identity): Extension<Identity>,
    mut db: DbSession,
) -> ApiResult<Json<UserResponse>> {
    let user = db
        .user_by_id(identity.id)
        .await?
        .ok_or_else(user_not_found)?;
    db.commit().await?;

    Ok(Json(user.into()))
}

/// Replaces the caller's password after checking the current one
///
/// # Errors
///
/// - `401 Unauthorized`: "Old password is incorrect"
/// - `404 Not Found`: the token's user no longer exists
/// - `422 Unprocessable Entity`: new password too short
pub async fn change_password(
    Extension(identity): Extension<Identity>,
    mut db: DbSession,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let user = db
        .user_by_id(identity.id)
        .await?
        .ok_or_else(user_not_found)?;

    if !password::verify_password(&req.password, &user.hashed_password)? {
        return Err(ApiError::Unauthorized("Old password is incorrect".to_string()));
    }

    let hashed_password = password::hash_password(&req.new_password)?;
    if !db.update_password(user.id, &hashed_password).await? {
        return Err(user_not_found());
    }
    db.commit().await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Sets the caller's phone number
///
/// A number already used by another account violates the unique constraint
/// and comes back as a 500.
pub async fn change_phone_number(
    Extension(identity): Extension<Identity>,
    mut db: DbSession,
    Json(req): Json<ChangePhoneNumberRequest>,
) -> ApiResult<StatusCode> {
    if !db.update_phone_number(identity.id, &req.phone_number).await? {
        return Err(user_not_found());
    }
    db.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
